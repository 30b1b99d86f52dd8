use crate::*;

/// Celebration shown once before a milestone level starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Milestone {
    pub level: Level,
    pub title: &'static str,
    pub subtitle: &'static str,
}

const fn milestone(level: Level, title: &'static str, subtitle: &'static str) -> Milestone {
    Milestone {
        level,
        title,
        subtitle,
    }
}

pub static MILESTONES: [Milestone; 9] = [
    milestone(10, "Level 10!", "Great start!"),
    milestone(25, "Level 25!", "Getting tougher!"),
    milestone(50, "Level 50!", "PARTIAL MIRRORS UNLOCKED!"),
    milestone(75, "Level 75!", "You're amazing!"),
    milestone(100, "Level 100!", "TIMER MODE UNLOCKED!"),
    milestone(150, "Level 150!", "CIRCLES UNLOCKED!"),
    milestone(200, "Level 200!", "TRIANGLES UNLOCKED!"),
    milestone(250, "Level 250!", "COLORS UNLOCKED!"),
    milestone(300, "Level 300!", "STARS UNLOCKED!"),
];

pub fn milestone_for(level: Level) -> Option<&'static Milestone> {
    MILESTONES.iter().find(|milestone| milestone.level == level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_levels_are_milestones() {
        let levels: alloc::vec::Vec<Level> = (1..=400).filter(|&l| milestone_for(l).is_some()).collect();
        assert_eq!(levels, [10, 25, 50, 75, 100, 150, 200, 250, 300]);
    }

    #[test]
    fn milestones_announce_unlocks() {
        assert_eq!(milestone_for(100).map(|m| m.subtitle), Some("TIMER MODE UNLOCKED!"));
        assert_eq!(milestone_for(150).map(|m| m.subtitle), Some("CIRCLES UNLOCKED!"));
    }
}
