use crate::sync;
use crate::theme::Theme;
use crate::utils::*;
use clap::Args;
use gloo::timers::callback::{Interval, Timeout};
use mirrorlit_core as game;
use game::{Axis, Cell, CellIndex, ColorKind, Coord, Dispatch, Effect, LevelConfig, MirrorSpan};
use game::{PlayEngine, Progress, Score, Session, SessionPhase, ShapeKind, TickOutcome, TimerUrgency};
use mirrorlit_protocol::LeaderboardResponse;
use wasm_bindgen_futures::spawn_local;
use web_time::Instant;
use yew::prelude::*;

const TICK_MILLIS: u32 = game::TICK_INTERVAL.as_millis() as u32;
const WIN_PAUSE_MILLIS: u32 = 1000;
const MILESTONE_PAUSE_MILLIS: u32 = 800;
const TIMEOUT_PAUSE_MILLIS: u32 = 1500;
const PENALTY_FLASH_MILLIS: u32 = 800;
const LEADERBOARD_REFRESH_MILLIS: u32 = 30_000;

/// Where a cell of the combined grid comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum GridSlot {
    Pattern(CellIndex),
    Player(CellIndex),
}

/// Splits the combined `rows x cols` grid into the pattern half and the player half.
fn grid_slot(config: &LevelConfig, row: Coord, col: Coord) -> GridSlot {
    let (row, col) = (usize::from(row), usize::from(col));
    let pattern_rows = usize::from(config.pattern_rows());
    let pattern_cols = usize::from(config.pattern_cols());
    let player_cols = usize::from(config.player_cols());

    match config.axis {
        Axis::Vertical if col < pattern_cols => GridSlot::Pattern(row * pattern_cols + col),
        Axis::Vertical => GridSlot::Player(row * player_cols + (col - pattern_cols)),
        Axis::Horizontal if row < pattern_rows => GridSlot::Pattern(row * pattern_cols + col),
        Axis::Horizontal => GridSlot::Player((row - pattern_rows) * player_cols + col),
    }
}

/// Inline position of the mirror line, shortened to the span of a partial mirror.
fn mirror_line_style(config: &LevelConfig, span: Option<MirrorSpan>) -> String {
    let rows = f32::from(config.rows);
    let cols = f32::from(config.cols);

    match config.axis {
        Axis::Vertical => {
            let left = f32::from(config.pattern_cols()) / cols * 100.0;
            let mut style = format!("left: calc({left:.2}% - 1.5px);");
            if let Some(span) = span {
                let cell = 100.0 / rows;
                let top = f32::from(span.start) * cell;
                let bottom = (rows - f32::from(span.start) - f32::from(span.length)) * cell;
                style.push_str(&format!(
                    " top: calc({top:.2}% + 10px); bottom: calc({bottom:.2}% + 10px);"
                ));
            }
            style
        }
        Axis::Horizontal => {
            let top = f32::from(config.pattern_rows()) / rows * 100.0;
            let mut style = format!("top: calc({top:.2}% - 1.5px);");
            if let Some(span) = span {
                let cell = 100.0 / cols;
                let left = f32::from(span.start) * cell;
                let right = (cols - f32::from(span.start) - f32::from(span.length)) * cell;
                style.push_str(&format!(
                    " left: calc({left:.2}% + 10px); right: calc({right:.2}% + 10px);"
                ));
            }
            style
        }
    }
}

fn status_line(phase: SessionPhase, just_reset: bool) -> (&'static str, String) {
    match phase {
        SessionPhase::Playing if just_reset => (
            "status-msg",
            "🔄 Progress reset! Starting fresh...".to_string(),
        ),
        SessionPhase::Playing => ("status-msg", "Tap to mirror the pattern".to_string()),
        SessionPhase::Celebrating { points } => {
            ("status-msg win", format!("✓ Perfect! +{points} points"))
        }
        SessionPhase::Milestone(milestone) => ("status-msg win", milestone.title.to_string()),
        SessionPhase::TimedOut => ("status-msg fail", "⏱️ Time's up! Retry...".to_string()),
    }
}

const fn shape_symbol(shape: ShapeKind) -> &'static str {
    use ShapeKind::*;
    match shape {
        Square => "■",
        Circle => "●",
        Triangle => "▲",
        Star => "★",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Loaded(Progress),
    Tap {
        version: game::BoardVersion,
        index: CellIndex,
    },
    SelectShape(ShapeKind),
    SelectColor(ColorKind),
    Tick(game::Epoch),
    Advance,
    DismissMilestone,
    HidePenalty,
    RefreshLeaderboard,
    Leaderboard(LeaderboardResponse),
    ToggleLeaderboard,
    AskReset,
    CancelReset,
    ConfirmReset,
    ResetDone,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    cell: Cell,
    #[prop_or_default]
    player: bool,
    #[prop_or_default]
    won: bool,
    #[prop_or_default]
    failed: bool,
    #[prop_or_default]
    onclick: Option<Callback<MouseEvent>>,
}

/// Player cells are marked wrong once the level has timed out.
fn cell_classes(cell: Cell, player: bool, won: bool, failed: bool) -> Classes {
    classes!(
        "cell",
        if player { "player" } else { "pattern" },
        (cell.shape != ShapeKind::Square).then_some(cell.shape.name()),
        cell.on.then_some("on"),
        (cell.on && cell.color != ColorKind::Green).then(|| format!("color-{}", cell.color.name())),
        won.then_some("won"),
        (player && failed).then_some("wrong"),
    )
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        cell,
        player,
        won,
        failed,
        onclick,
    } = props.clone();

    let class = cell_classes(cell, player, won, failed);

    html! {
        <div {class} {onclick}/>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    #[prop_or_default]
    pub seed: Option<u64>,

    /// Start on this level instead of the saved one
    #[arg(short, long)]
    #[prop_or_default]
    pub level: Option<game::Level>,
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: Option<Session>,
    shown_level: Option<game::Level>,
    timer: Option<Interval>,
    last_tick: Option<Instant>,
    pause: Option<Timeout>,
    penalty: Option<(Score, Timeout)>,
    leaderboard: Option<LeaderboardResponse>,
    leaderboard_open: bool,
    confirm_reset: bool,
    just_reset: bool,
    _leaderboard_refresh: Interval,
}

impl GameView {
    fn create_leaderboard_refresh(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(LEADERBOARD_REFRESH_MILLIS, move || {
            link.send_message(Msg::RefreshLeaderboard)
        })
    }

    /// Carries out everything the session queued since the last call.
    fn run_effects(&mut self, ctx: &Context<Self>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let effects = session.drain_effects();
        let level = session.engine().level();

        for effect in effects {
            self.run_effect(ctx, effect);
        }

        if self.shown_level != Some(level) {
            self.shown_level = Some(level);
            Theme::for_level(level).apply();
        }
    }

    fn run_effect(&mut self, ctx: &Context<Self>, effect: Effect) {
        match effect {
            Effect::StartTimer { epoch, total } => {
                log::debug!("timer started: {:?}", total);
                let link = ctx.link().clone();
                self.last_tick = Some(Instant::now());
                self.timer = Some(Interval::new(TICK_MILLIS, move || {
                    link.send_message(Msg::Tick(epoch))
                }));
            }
            Effect::StopTimer => {
                self.timer = None;
                self.last_tick = None;
            }
            Effect::SaveProgress(progress) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    match sync::save_progress(progress).await {
                        Ok(()) => link.send_message(Msg::RefreshLeaderboard),
                        Err(err) => log::warn!("backend save failed, kept in local storage: {}", err),
                    }
                });
            }
            Effect::ResetProgress => {
                sync::clear_local();
                ctx.link().send_message(Msg::RefreshLeaderboard);
            }
        }
    }

    fn schedule(&mut self, ctx: &Context<Self>, millis: u32, msg: Msg) {
        let link = ctx.link().clone();
        self.pause = Some(Timeout::new(millis, move || link.send_message(msg)));
    }

    fn flash_penalty(&mut self, ctx: &Context<Self>, penalty: Score) {
        let link = ctx.link().clone();
        let timeout = Timeout::new(PENALTY_FLASH_MILLIS, move || {
            link.send_message(Msg::HidePenalty)
        });
        self.penalty = Some((penalty, timeout));
    }

    fn tap(&mut self, ctx: &Context<Self>, version: game::BoardVersion, index: CellIndex) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let result = session.tap(version, index);
        let next_level = session.engine().level().saturating_add(1);

        let outcome = match result {
            Ok(Dispatch::Applied(outcome)) => outcome,
            Ok(Dispatch::Stale) => return false,
            Err(err) => {
                log::warn!("tap on {} rejected: {}", index, err);
                return false;
            }
        };
        self.just_reset = false;

        if let Some(penalty) = outcome.penalty {
            self.flash_penalty(ctx, penalty);
        }
        if outcome.is_win() {
            let pause = if game::milestone_for(next_level).is_some() {
                MILESTONE_PAUSE_MILLIS
            } else {
                WIN_PAUSE_MILLIS
            };
            self.schedule(ctx, pause, Msg::Advance);
        }
        self.run_effects(ctx);
        true
    }

    fn tick(&mut self, ctx: &Context<Self>, epoch: game::Epoch) -> bool {
        let now = Instant::now();
        let delta = self
            .last_tick
            .replace(now)
            .map_or(game::TICK_INTERVAL, |last| now.duration_since(last));
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        match session.tick(epoch, delta) {
            Dispatch::Stale => false,
            Dispatch::Applied(TickOutcome::TimedOut) => {
                self.run_effects(ctx);
                self.schedule(ctx, TIMEOUT_PAUSE_MILLIS, Msg::Advance);
                true
            }
            Dispatch::Applied(_) => true,
        }
    }

    fn view_timer(engine: &PlayEngine) -> Html {
        let Some(timer) = engine.timer() else {
            return html! {};
        };
        let urgency = match timer.urgency() {
            TimerUrgency::Calm => None,
            TimerUrgency::Warning => Some("warning"),
            TimerUrgency::Danger => Some("danger"),
        };
        let style = format!("width: {:.1}%", timer.fraction_remaining() * 100.0);
        let remaining = format!("⏱ {:.1}s", timer.remaining().as_secs_f32());

        html! {
            <div class="timer-container active">
                <div class={classes!("timer-fill", urgency)} {style}/>
                <span class="timer-badge">{remaining}</span>
            </div>
        }
    }

    fn view_grid(ctx: &Context<Self>, session: &Session) -> Html {
        let engine = session.engine();
        let config = engine.config();
        let version = session.version();
        let playing = session.phase().is_playing();
        let won = matches!(session.phase(), SessionPhase::Celebrating { .. });
        let failed = session.phase() == SessionPhase::TimedOut;

        let grid_style = format!("grid-template-columns: repeat({}, 1fr)", config.cols);
        let line_class = classes!(
            "mirror-line",
            if config.axis.is_vertical() { "vertical" } else { "horizontal" }
        );
        let line_style = mirror_line_style(config, engine.puzzle().mirror().span());

        let cells = (0..config.rows)
            .flat_map(|row| (0..config.cols).map(move |col| (row, col)))
            .map(|(row, col)| match grid_slot(config, row, col) {
                GridSlot::Pattern(index) => {
                    let cell = engine.pattern_cell(index).unwrap_or(Cell::OFF);
                    html! { <CellView {cell} {won}/> }
                }
                GridSlot::Player(index) => {
                    let cell = engine.player_cell(index).unwrap_or(Cell::OFF);
                    let onclick = playing
                        .then(|| ctx.link().callback(move |_| Msg::Tap { version, index }));
                    html! { <CellView {cell} player=true {won} {failed} {onclick}/> }
                }
            });

        html! {
            <div class="grid" style={grid_style}>
                <div class={line_class} style={line_style}/>
                { for cells }
            </div>
        }
    }

    fn view_palettes(ctx: &Context<Self>, session: &Session) -> Html {
        let unlocks = session.engine().unlocks();
        let selection = session.selection();

        let shapes = unlocks.has_shape_palette().then(|| {
            html! {
                <div class="shape-palette active">
                    {
                        for unlocks.shapes.iter().map(|&shape| {
                            let class = classes!(
                                "shape-btn",
                                shape.name(),
                                (shape == selection.shape).then_some("selected")
                            );
                            let onclick = ctx.link().callback(move |_| Msg::SelectShape(shape));
                            html! { <button {class} {onclick}>{shape_symbol(shape)}</button> }
                        })
                    }
                </div>
            }
        });

        let colors = unlocks.has_color_palette().then(|| {
            html! {
                <div class="color-palette active">
                    {
                        for unlocks.colors.iter().map(|&color| {
                            let class = classes!(
                                "color-btn",
                                format!("color-{}", color.name()),
                                (color == selection.color).then_some("selected")
                            );
                            let onclick = ctx.link().callback(move |_| Msg::SelectColor(color));
                            html! { <button {class} {onclick}/> }
                        })
                    }
                </div>
            }
        });

        html! {
            <>
                { shapes }
                { colors }
            </>
        }
    }

    fn view_leaderboard(&self, ctx: &Context<Self>) -> Html {
        let close = ctx.link().callback(|_| Msg::ToggleLeaderboard);
        let (rank_text, items) = match &self.leaderboard {
            Some(board) => {
                let items = board
                    .positioned()
                    .map(|(position, entry)| {
                        html! {
                            <div class={classes!("lb-item", entry.is_current_user.then_some("current"))}>
                                <span class="lb-pos">{format!("#{position}")}</span>
                                <span class="lb-name">{entry.name.clone()}</span>
                                <span class="lb-score">{format!("⭐{}", entry.score)}</span>
                                <span class="lb-level">{format!("Lv.{}", entry.level)}</span>
                            </div>
                        }
                    })
                    .collect::<Html>();
                (board.rank_text(), items)
            }
            None => (String::new(), html! {}),
        };

        html! {
            <aside class={classes!("leaderboard-panel", self.leaderboard_open.then_some("open"))}>
                <header>
                    <span>{"Leaderboard"}</span>
                    <button class="lb-close" onclick={close}>{"✕"}</button>
                </header>
                <p class="lb-rank-text">{rank_text}</p>
                <div class="lb-content">{items}</div>
            </aside>
        }
    }

    fn view_confirm_reset(&self, ctx: &Context<Self>) -> Html {
        let cancel = ctx.link().callback(|_| Msg::CancelReset);
        let confirm = ctx.link().callback(|_| Msg::ConfirmReset);

        html! {
            <div class={classes!("confirm-overlay", self.confirm_reset.then_some("open"))}>
                <p>{"Reset all progress and start over from level 1?"}</p>
                <button class="confirm-cancel" onclick={cancel}>{"Cancel"}</button>
                <button class="confirm-yes" onclick={confirm}>{"Reset"}</button>
            </div>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            let progress = sync::load_progress().await;
            link.send_message(Msg::Loaded(progress));
        });
        ctx.link().send_message(Msg::RefreshLeaderboard);

        Self {
            session: None,
            shown_level: None,
            timer: None,
            last_tick: None,
            pause: None,
            penalty: None,
            leaderboard: None,
            leaderboard_open: false,
            confirm_reset: false,
            just_reset: false,
            _leaderboard_refresh: GameView::create_leaderboard_refresh(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Loaded(progress) => {
                let props = ctx.props();
                let progress = props
                    .level
                    .map_or(progress, |level| Progress::new(level, progress.score));
                let seed = props.seed.unwrap_or_else(js_random_seed);
                log::debug!("seed: {}", seed);
                self.session = Some(Session::new(progress, seed));
                self.run_effects(ctx);
                true
            }
            Tap { version, index } => self.tap(ctx, version, index),
            SelectShape(shape) => match self.session.as_mut().map(|s| s.select_shape(shape)) {
                Some(Ok(())) => true,
                Some(Err(err)) => {
                    log::warn!("cannot select {}: {}", shape.name(), err);
                    false
                }
                None => false,
            },
            SelectColor(color) => match self.session.as_mut().map(|s| s.select_color(color)) {
                Some(Ok(())) => true,
                Some(Err(err)) => {
                    log::warn!("cannot select {}: {}", color.name(), err);
                    false
                }
                None => false,
            },
            Tick(epoch) => self.tick(ctx, epoch),
            Advance => {
                self.pause = None;
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                session.advance();
                self.run_effects(ctx);
                true
            }
            DismissMilestone => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                session.dismiss_milestone();
                self.run_effects(ctx);
                true
            }
            HidePenalty => self.penalty.take().is_some(),
            RefreshLeaderboard => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    match sync::fetch_leaderboard().await {
                        Ok(Some(board)) => link.send_message(Msg::Leaderboard(board)),
                        Ok(None) => log::debug!("leaderboard unavailable"),
                        Err(err) => log::warn!("leaderboard fetch failed: {}", err),
                    }
                });
                false
            }
            Leaderboard(board) => {
                let updated = self.leaderboard.as_ref() != Some(&board);
                self.leaderboard = Some(board);
                updated
            }
            ToggleLeaderboard => {
                self.leaderboard_open = !self.leaderboard_open;
                if self.leaderboard_open {
                    ctx.link().send_message(RefreshLeaderboard);
                }
                true
            }
            AskReset => {
                self.confirm_reset = true;
                true
            }
            CancelReset => {
                self.confirm_reset = false;
                true
            }
            ConfirmReset => {
                self.confirm_reset = false;
                let link = ctx.link().clone();
                spawn_local(async move {
                    match sync::reset_remote().await {
                        Ok(true) => link.send_message(Msg::ResetDone),
                        Ok(false) => log::warn!("backend refused the reset"),
                        Err(err) => log::warn!("reset failed: {}", err),
                    }
                });
                true
            }
            ResetDone => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                session.reset();
                self.pause = None;
                self.penalty = None;
                self.just_reset = true;
                self.run_effects(ctx);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let Some(session) = self.session.as_ref() else {
            return html! {
                <div class="mirrorlit loading">
                    <p class="status-msg">{"Loading…"}</p>
                </div>
            };
        };
        let engine = session.engine();
        let (status_class, status_text) = status_line(session.phase(), self.just_reset);

        let rank_badge = self.leaderboard.as_ref().map(|board| {
            html! { <span class="user-rank-badge">{format!("#{}", board.user_rank)}</span> }
        });
        let penalty = self.penalty.as_ref().map(|(penalty, _)| {
            html! { <span class="penalty show">{format!("-{penalty}")}</span> }
        });
        let milestone = match session.phase() {
            SessionPhase::Milestone(milestone) => {
                let onclick = ctx.link().callback(|_| DismissMilestone);
                html! {
                    <div class="milestone-overlay active">
                        <div class="milestone-text">{milestone.title}</div>
                        <div class="milestone-sub">{milestone.subtitle}</div>
                        <button class="milestone-btn" {onclick}>{"Continue"}</button>
                    </div>
                }
            }
            _ => html! {},
        };

        let cb_leaderboard = ctx.link().callback(|_| ToggleLeaderboard);
        let cb_reset = ctx.link().callback(|_| AskReset);

        html! {
            <div class="mirrorlit">
                <nav>
                    <span class="level">{format!("Level {}", engine.level())}</span>
                    <span class="phase-badge">{engine.config().phase.label()}</span>
                    <span class="score">{format!("⭐ {}", engine.score())}</span>
                    { rank_badge }
                </nav>
                { GameView::view_timer(engine) }
                { GameView::view_grid(ctx, session) }
                { penalty }
                <p class={status_class}>{status_text}</p>
                { GameView::view_palettes(ctx, session) }
                <footer>
                    <button class="lb-toggle" onclick={cb_leaderboard}>{"🏆"}</button>
                    <button class="reset-btn" onclick={cb_reset}>{"↺"}</button>
                </footer>
                { self.view_leaderboard(ctx) }
                { self.view_confirm_reset(ctx) }
                { milestone }
            </div>
        }
    }
}
