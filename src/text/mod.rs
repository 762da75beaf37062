//! Text feature extraction for content similarity.
//!
//! The content engine turns each catalog item into a weighted term
//! blob, normalizes it with [`preprocess`], vectorizes it with a
//! TF-IDF-weighted n-gram scheme ([`vectorize::TermVectorizer`]) and
//! compares vectors with [`similarity::cosine_similarity`].

pub mod similarity;
pub mod vectorize;

pub use similarity::cosine_similarity;
pub use vectorize::TermVectorizer;

/// Normalizes raw catalog text for vectorization.
///
/// Lowercases, replaces punctuation and digits with spaces, and
/// collapses runs of whitespace. Model numbers lose their digits so
/// "RTX 4070" and "RTX 4080" land on the same terms.
///
/// # Examples
///
/// ```
/// use recomendar::text::preprocess;
///
/// assert_eq!(preprocess("GeForce RTX-4070, 12GB!"), "geforce rtx gb");
/// ```
#[must_use]
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mapped: String = lowered
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
