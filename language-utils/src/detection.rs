//! Fast, offline language classification.
//!
//! This is the first layer of language detection: a script count, then for
//! Latin-script text a vote over common function words. It only answers when
//! the evidence is clear; anything ambiguous returns `None` so the caller can
//! fall back to a slower classifier.

use std::collections::BTreeMap;

use crate::{LANGUAGES, Language, WritingSystem};

const ENGLISH: &[&str] = &[
    "the", "and", "is", "are", "was", "were", "you", "i", "it", "of", "to", "in", "that", "this",
    "with", "have", "has", "what", "my", "your", "do", "does", "not", "be", "he", "she", "they",
    "we", "for", "on", "at",
];
const SPANISH: &[&str] = &[
    "el", "la", "los", "las", "es", "y", "que", "de", "en", "un", "una", "yo", "tú", "usted",
    "está", "estoy", "por", "para", "con", "no", "se", "como", "qué", "muy", "pero", "su", "del",
    "al", "hola", "eres", "soy",
];
const FRENCH: &[&str] = &[
    "le", "la", "les", "est", "et", "je", "tu", "il", "elle", "nous", "vous", "ils", "un", "une",
    "des", "du", "de", "que", "qui", "pas", "ne", "suis", "c", "l", "d", "j", "avec", "pour",
    "dans", "au", "ce", "mais", "très", "comment",
];
const GERMAN: &[&str] = &[
    "der", "die", "das", "und", "ist", "ich", "du", "er", "sie", "wir", "ihr", "nicht", "ein",
    "eine", "zu", "mit", "auf", "den", "dem", "bin", "bist", "sind", "wie", "was", "heißt", "auch",
    "es",
];
const ITALIAN: &[&str] = &[
    "il", "lo", "la", "gli", "le", "è", "e", "che", "di", "un", "una", "io", "tu", "lui", "lei",
    "noi", "voi", "sono", "sei", "non", "con", "per", "come", "ti", "mi", "ci", "del", "della",
    "chi", "cosa", "molto", "ma",
];
const PORTUGUESE: &[&str] = &[
    "o", "a", "os", "as", "é", "e", "que", "de", "um", "uma", "eu", "você", "não", "com", "para",
    "por", "do", "da", "em", "no", "na", "são", "está", "estou", "como", "muito", "mas", "ele",
    "ela",
];

fn stopwords(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => ENGLISH,
        Language::Spanish => SPANISH,
        Language::French => FRENCH,
        Language::German => GERMAN,
        Language::Italian => ITALIAN,
        Language::Portuguese => PORTUGUESE,
        Language::Korean | Language::Chinese | Language::Japanese | Language::Russian => &[],
    }
}

/// Letters that only one of the Latin-script languages uses.
fn distinctive_letter(c: char) -> Option<Language> {
    match c {
        'ñ' | '¿' | '¡' => Some(Language::Spanish),
        'ß' => Some(Language::German),
        'ã' | 'õ' => Some(Language::Portuguese),
        _ => None,
    }
}

fn script_of(c: char) -> Option<WritingSystem> {
    match c as u32 {
        0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Some(WritingSystem::Hangul),
        0x3040..=0x30FF => Some(WritingSystem::Japanese),
        0x3400..=0x4DBF | 0x4E00..=0x9FFF => Some(WritingSystem::Han),
        0x0400..=0x04FF => Some(WritingSystem::Cyrillic),
        _ if c.is_alphabetic() && (c as u32) <= 0x024F => Some(WritingSystem::Latin),
        _ => None,
    }
}

/// Classify `sentence`, or return `None` when the evidence is not conclusive.
pub fn classify(sentence: &str) -> Option<Language> {
    let mut scripts: BTreeMap<u8, usize> = BTreeMap::new();
    let mut kana = 0;
    for c in sentence.chars() {
        let Some(script) = script_of(c) else {
            continue;
        };
        if script == WritingSystem::Japanese {
            kana += 1;
        }
        *scripts.entry(script_rank(script)).or_default() += 1;
    }

    let (&dominant, _) = scripts.iter().max_by_key(|(_, count)| **count)?;
    match dominant {
        HANGUL => Some(Language::Korean),
        CYRILLIC => Some(Language::Russian),
        // Japanese mixes kanji into kana text, so any kana settles it.
        HAN | KANA if kana > 0 => Some(Language::Japanese),
        HAN => Some(Language::Chinese),
        LATIN => classify_latin(sentence),
        _ => None,
    }
}

const LATIN: u8 = 0;
const HANGUL: u8 = 1;
const CYRILLIC: u8 = 2;
const HAN: u8 = 3;
const KANA: u8 = 4;

fn script_rank(script: WritingSystem) -> u8 {
    match script {
        WritingSystem::Latin => LATIN,
        WritingSystem::Hangul => HANGUL,
        WritingSystem::Cyrillic => CYRILLIC,
        WritingSystem::Han => HAN,
        WritingSystem::Japanese => KANA,
    }
}

fn classify_latin(sentence: &str) -> Option<Language> {
    let lowercase = sentence.to_lowercase();
    let mut scores: BTreeMap<Language, usize> = BTreeMap::new();

    for token in lowercase.split(|c: char| !c.is_alphabetic()) {
        if token.is_empty() {
            continue;
        }
        for language in LANGUAGES
            .iter()
            .filter(|language| language.writing_system() == WritingSystem::Latin)
        {
            if stopwords(*language).contains(&token) {
                *scores.entry(*language).or_default() += 1;
            }
        }
    }
    for c in lowercase.chars() {
        if let Some(language) = distinctive_letter(c) {
            *scores.entry(language).or_default() += 1;
        }
    }

    let mut ranked: Vec<(Language, usize)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let (winner, best) = *ranked.first()?;
    let runner_up = ranked.get(1).map_or(0, |(_, score)| *score);
    (best >= MIN_LATIN_EVIDENCE && best - runner_up >= MIN_LATIN_EVIDENCE).then_some(winner)
}

/// Hits a Latin-script language needs, both in total and as a lead over the
/// runner-up. A single shared word like "come" or "en" is not enough.
const MIN_LATIN_EVIDENCE: usize = 2;
