use regex::Regex;
use std::sync::LazyLock;

use super::pattern;
use super::tournaments::{MAX_PRE_ROUND, Phase, Round};

static ROUND_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| pattern::compile("round number", r"round\s*(\d+)"));

/// Label a results block heading ("Semifinals - 12/03", "Round 2").
///
/// `ordinal` is the 1-based position of the block within its phase, used for
/// pre-draw headings that carry no round number.
pub fn label_round(phase: Phase, heading: &str, ordinal: usize) -> Round {
    let heading = heading
        .split(" - ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if phase.is_main_draw() {
        label_main_draw(&heading)
    } else {
        label_pre_draw(&heading, ordinal)
    }
}

fn label_main_draw(heading: &str) -> Round {
    let compact = heading.replace([' ', '-'], "");

    if compact.contains("semifinal") {
        Round::Semi
    } else if compact.contains("quarterfinal") {
        Round::Quarter
    } else if heading.contains("1/8") {
        Round::RoundOfEight
    } else if heading.contains("1/16") {
        Round::RoundOfSixteen
    } else if heading.contains("final") {
        Round::Final
    } else {
        Round::RoundOfSixteen
    }
}

fn label_pre_draw(heading: &str, ordinal: usize) -> Round {
    let numbered = ROUND_NUMBER
        .as_ref()
        .and_then(|re| re.captures(heading))
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse::<u8>().ok());

    let number = numbered.unwrap_or_else(|| u8::try_from(ordinal).unwrap_or(MAX_PRE_ROUND));
    Round::Pre(number.clamp(1, MAX_PRE_ROUND))
}
