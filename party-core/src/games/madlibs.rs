use party_types::{GameType, PlayerId, SessionStateSnapshot, WordProgress};
use rand::Rng;

use super::{Award, InputOutcome, MiniGame};
use crate::SessionError;

/// Story templates. Each `{word_type}` placeholder becomes one blank,
/// filled in the order it appears.
pub const TEMPLATES: [&str; 5] = [
    "Last summer my {adjective} {family_member} tried to {verb} across the {place}. \
     Halfway there a {animal} shouted '{exclamation}!' and everyone went home.",
    "Welcome to the {adjective} {place}! Today's special is {number} {plural_noun} \
     served by a {occupation} who insists you {verb} before eating.",
    "Scientists have discovered a {adjective} {noun} that can {verb} faster than a \
     {animal}. Experts call it '{adjective}' and recommend {verb_ing} indoors.",
    "Dear {person_name}, your {noun} has been {verb_past_tense} by a {adjective} \
     {occupation}. Please bring {number} {plural_noun} to the {place}.",
    "Every morning the {adjective} {animal} would {verb} on the {noun}, \
     until one day a {occupation} said '{exclamation}' and {verb_past_tense} away.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    Text(String),
    Blank(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<TemplateSegment>,
}

impl Template {
    /// An unterminated `{` is kept as literal text.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
                break;
            };
            if open > 0 {
                segments.push(TemplateSegment::Text(rest[..open].to_string()));
            }
            let word_type = rest[open + 1..close].trim();
            segments.push(TemplateSegment::Blank(word_type.to_string()));
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(TemplateSegment::Text(rest.to_string()));
        }

        Self { segments }
    }

    pub fn blanks(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            TemplateSegment::Blank(word_type) => Some(word_type.as_str()),
            TemplateSegment::Text(_) => None,
        })
    }

    pub fn blank_count(&self) -> usize {
        self.blanks().count()
    }

    /// Substitute words in order; blanks without a word show their type.
    pub fn render(&self, words: &[String]) -> String {
        let mut story = String::new();
        let mut words = words.iter();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Text(text) => story.push_str(text),
                TemplateSegment::Blank(word_type) => match words.next() {
                    Some(word) => story.push_str(word),
                    None => {
                        story.push('[');
                        story.push_str(&display_word_type(word_type));
                        story.push(']');
                    }
                },
            }
        }
        story
    }
}

fn display_word_type(word_type: &str) -> String {
    word_type.replace('_', " ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MadLibs {
    template: Template,
    words: Vec<String>,
    submissions: usize,
    submission_cap: usize,
}

impl MadLibs {
    pub fn random<R: Rng>(rng: &mut R, submission_cap: usize) -> Self {
        let source = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        Self::from_template(source, submission_cap)
    }

    pub fn from_template(source: &str, submission_cap: usize) -> Self {
        Self {
            template: Template::parse(source),
            words: Vec::new(),
            submissions: 0,
            submission_cap,
        }
    }

    pub fn total_blanks(&self) -> usize {
        self.template.blank_count()
    }

    pub fn collected(&self) -> usize {
        self.words.len()
    }

    pub fn next_word_type(&self) -> Option<String> {
        self.template
            .blanks()
            .nth(self.words.len())
            .map(display_word_type)
    }

    pub fn is_complete(&self) -> bool {
        self.words.len() >= self.total_blanks() || self.submissions >= self.submission_cap
    }

    pub fn story(&self) -> String {
        self.template.render(&self.words)
    }
}

impl MiniGame for MadLibs {
    fn game_type(&self) -> GameType {
        GameType::MadLibs
    }

    fn instructions(&self) -> String {
        "Fill in the blanks with words!".to_string()
    }

    fn prompt(&self) -> String {
        match self.next_word_type() {
            Some(word_type) => format!("Next word: {}", word_type),
            None => "All words collected!".to_string(),
        }
    }

    fn needs_input(&self) -> bool {
        true
    }

    fn on_player_input(
        &mut self,
        _player: PlayerId,
        input: &str,
    ) -> Result<InputOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::CapacityReached {
                game_type: GameType::MadLibs,
                limit: self.submission_cap,
            });
        }

        self.submissions += 1;
        self.words.push(input.to_string());

        if self.is_complete() {
            Ok(InputOutcome::Completed {
                award: Award::Participation,
                winner: None,
            })
        } else {
            Ok(InputOutcome::Accepted {
                award: Award::Participation,
            })
        }
    }

    fn result(&self) -> String {
        self.story()
    }

    fn annotate(&self, snapshot: &mut SessionStateSnapshot) {
        snapshot.word_progress = Some(WordProgress {
            collected: self.collected() as u32,
            total: self.total_blanks() as u32,
            next_word_type: self.next_word_type(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_template_parsing() {
        let template = Template::parse("A {adjective} {plural_noun} walked {place}.");
        assert_eq!(
            template.blanks().collect::<Vec<_>>(),
            vec!["adjective", "plural_noun", "place"]
        );
        assert_eq!(
            template.render(&["tall".to_string()]),
            "A tall [plural noun] walked [place]."
        );

        let literal = Template::parse("no blanks {here");
        assert_eq!(literal.blank_count(), 0);
        assert_eq!(literal.render(&[]), "no blanks {here");
    }

    #[test]
    fn test_every_bundled_template_has_blanks() {
        for source in TEMPLATES {
            let template = Template::parse(source);
            assert!(template.blank_count() >= 5, "{source}");
            assert!(template.blank_count() < 20, "{source}");
        }
    }

    #[test]
    fn test_words_fill_blanks_in_order() {
        let mut game = MadLibs::from_template("The {adjective} {noun} can {verb}.", 20);
        let player = Uuid::new_v4();

        assert_eq!(game.prompt(), "Next word: adjective");
        assert_eq!(
            game.on_player_input(player, "fuzzy"),
            Ok(InputOutcome::Accepted {
                award: Award::Participation
            })
        );
        assert_eq!(game.next_word_type().as_deref(), Some("noun"));
        game.on_player_input(player, "toaster").unwrap();
        assert!(!game.is_complete());

        assert_eq!(
            game.on_player_input(player, "dance"),
            Ok(InputOutcome::Completed {
                award: Award::Participation,
                winner: None
            })
        );
        assert_eq!(game.story(), "The fuzzy toaster can dance.");
    }

    #[test]
    fn test_submission_cap_finishes_the_story() {
        let mut game = MadLibs::from_template("{a} {b} {c} {d}", 2);
        let player = Uuid::new_v4();

        game.on_player_input(player, "one").unwrap();
        let outcome = game.on_player_input(player, "two").unwrap();
        assert!(matches!(outcome, InputOutcome::Completed { .. }));
        assert_eq!(game.story(), "one two [c] [d]");

        assert_eq!(
            game.on_player_input(player, "three"),
            Err(SessionError::CapacityReached {
                game_type: GameType::MadLibs,
                limit: 2
            })
        );
    }

    #[test]
    fn test_special_characters_are_echoed() {
        let mut game = MadLibs::from_template("Say {exclamation}", 20);
        game.on_player_input(Uuid::new_v4(), "<b>\"wow\" & 'ok'</b>")
            .unwrap();
        assert_eq!(game.story(), "Say <b>\"wow\" & 'ok'</b>");
    }

    #[test]
    fn test_annotate_reports_progress() {
        let mut game = MadLibs::from_template("{adjective} {noun}", 20);
        game.on_player_input(Uuid::new_v4(), "shiny").unwrap();

        let mut snapshot = SessionStateSnapshot::default();
        game.annotate(&mut snapshot);
        assert_eq!(
            snapshot.word_progress,
            Some(WordProgress {
                collected: 1,
                total: 2,
                next_word_type: Some("noun".to_string()),
            })
        );
    }
}
