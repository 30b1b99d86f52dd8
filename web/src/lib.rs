use clap::Parser;
use wasm_bindgen::prelude::*;

mod game;
mod sync;
mod theme;
mod utils;

/// Options read from the location hash, e.g. `#-vv&--level=120&--seed=7`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(flatten)]
    game: game::GameProps,
}

fn parse_hash_args(location_hash: &str) -> Result<Args, clap::Error> {
    Args::try_parse_from(location_hash.split(['#', '&']))
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window().location().hash().unwrap_or_default();

    let args = match parse_hash_args(&location_hash) {
        Ok(args) => args,
        Err(err) => {
            gloo::console::warn!(format!("ignoring location hash: {err}"));
            Args {
                verbose: Default::default(),
                game: game::GameProps {
                    seed: None,
                    level: None,
                },
            }
        }
    };
    if let Some(log_level) = args.verbose.log_level() {
        if let Err(err) = console_log::init_with_level(log_level) {
            gloo::console::warn!(format!("error initializing logger: {err}"));
        }
    }
    log::debug!("args: {:?}", args);

    let Some(root) = document().get_element_by_id("game") else {
        log::error!("could not find id=\"game\" element");
        return;
    };

    log::debug!("App started");
    yew::Renderer::<game::GameView>::with_root_and_props(root, args.game).render();
}
