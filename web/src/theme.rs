use mirrorlit_core::Level;

/// Background and the two glow orbs; every level moves on to the next palette.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Theme {
    pub background: &'static str,
    pub orb: [&'static str; 2],
}

const fn theme(background: &'static str, orb1: &'static str, orb2: &'static str) -> Theme {
    Theme {
        background,
        orb: [orb1, orb2],
    }
}

static THEMES: [Theme; 6] = [
    theme("#0a0a12", "#10B981", "#3B82F6"),
    theme("#0f0a18", "#8B5CF6", "#EC4899"),
    theme("#0a1212", "#14B8A6", "#06B6D4"),
    theme("#120a0a", "#EF4444", "#F97316"),
    theme("#0a0a18", "#6366F1", "#A78BFA"),
    theme("#0f0f0a", "#EAB308", "#84CC16"),
];

impl Theme {
    pub const ATTR_NAME: &'static str = "style";

    pub(crate) fn for_level(level: Level) -> &'static Self {
        let index = level.saturating_sub(1) as usize % THEMES.len();
        &THEMES[index]
    }

    fn css_vars(&self) -> String {
        format!(
            "--bg: {}; --orb1: {}; --orb2: {};",
            self.background, self.orb[0], self.orb[1]
        )
    }

    /// Exposes the palette as CSS variables on the `<html>` element.
    pub(crate) fn apply(&self) {
        use gloo::utils::document;
        let Some(html) = document().document_element() else {
            log::error!("no html element to theme");
            return;
        };
        if let Err(err) = html.set_attribute(Self::ATTR_NAME, &self.css_vars()) {
            log::error!("failed to set theme: {:?}", err);
        }
    }
}
