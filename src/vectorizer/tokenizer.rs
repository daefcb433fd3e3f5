use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use unicode_segmentation::UnicodeSegmentation;

/// Separator used to join adjacent words into a bigram term
pub const BIGRAM_SEPARATOR: char = '_';

/// Strip diacritics: NFKD decomposition, then drop every combining mark.
/// "animación" -> "animacion", "Ñandú" -> "Nandu"
pub fn fold_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalized words of `text`, in order.
///
/// Words are found on Unicode word boundaries and then split again on any
/// non-alphanumeric character, so `snake_case` and `don't` yield two words each.
pub fn words(text: &str) -> Vec<String> {
    let folded = fold_accents(text).to_lowercase();
    let mut out = Vec::new();
    for word in folded.unicode_words() {
        out.extend(
            word.split(|c: char| !c.is_alphanumeric())
                .filter(|piece| !piece.is_empty())
                .map(str::to_string),
        );
    }
    out
}

/// Unigrams followed by bigrams (`a_b`) of every adjacent word pair.
///
/// Empty or whitespace-only text gives an empty list.
pub fn tokenize(text: &str) -> Vec<String> {
    let words = words(text);
    if words.is_empty() {
        return Vec::new();
    }
    let mut tokens = Vec::with_capacity(words.len() * 2 - 1);
    for pair in words.windows(2) {
        let mut bigram = String::with_capacity(pair[0].len() + pair[1].len() + 1);
        bigram.push_str(&pair[0]);
        bigram.push(BIGRAM_SEPARATOR);
        bigram.push_str(&pair[1]);
        tokens.push(bigram);
    }
    // unigrams first, like reading order
    let mut unigrams = words;
    unigrams.append(&mut tokens);
    unigrams
}
