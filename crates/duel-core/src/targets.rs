/// A challenge target both players must recreate.
#[derive(Clone, Copy, Debug)]
pub struct Target {
    pub title: &'static str,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
}

impl Target {
    /// The assignment text handed to both players.
    pub fn full_prompt(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }

    /// Context string handed to the scoring capability.
    pub fn grading_context(&self) -> String {
        let requirements = self
            .requirements
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Challenge: {}\nDescription: {}\n\nRequirements:\n{}",
            self.title, self.description, requirements
        )
    }
}

/// Built-in challenge catalogue.
pub const TARGETS: &[Target] = &[
    Target {
        title: "Coffee Shop Landing Page",
        description: "Create a landing page for a local coffee shop",
        requirements: &[
            "Hero section with shop name and tagline",
            "Menu section with at least three drinks",
            "Opening hours and location footer",
        ],
    },
    Target {
        title: "Weather Dashboard",
        description: "Create a dashboard showing current weather and a forecast",
        requirements: &[
            "Current temperature prominently displayed",
            "Five-day forecast cards",
            "Visual distinction between day and night",
        ],
    },
    Target {
        title: "Retro Arcade Scoreboard",
        description: "Create a high-score table for a retro arcade game",
        requirements: &[
            "Pixel-style typography",
            "Top ten ranked entries",
            "Blinking 'insert coin' call to action",
        ],
    },
    Target {
        title: "Personal Portfolio",
        description: "Create a one-page portfolio for a freelance designer",
        requirements: &[
            "About section with a short bio",
            "Project gallery with at least four items",
            "Contact form with name, email and message fields",
        ],
    },
    Target {
        title: "Music Player Widget",
        description: "Create a compact music player card",
        requirements: &[
            "Album art placeholder",
            "Play, pause and skip controls",
            "Progress bar with elapsed time",
        ],
    },
];

/// Pick a random target from the catalogue.
pub fn random_target() -> &'static Target {
    use rand::RngExt;
    let mut rng = rand::rng();
    let idx = rng.random_range(0..TARGETS.len());
    &TARGETS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_prompt_joins_title_and_description() {
        let t = &TARGETS[0];
        assert_eq!(
            t.full_prompt(),
            "Coffee Shop Landing Page: Create a landing page for a local coffee shop"
        );
    }

    #[test]
    fn grading_context_lists_requirements() {
        let ctx = TARGETS[1].grading_context();
        assert!(ctx.contains("Challenge: Weather Dashboard"));
        assert!(ctx.contains("- Five-day forecast cards"));
    }

    #[test]
    fn random_target_is_from_catalogue() {
        let t = random_target();
        assert!(TARGETS.iter().any(|c| c.title == t.title));
    }
}
