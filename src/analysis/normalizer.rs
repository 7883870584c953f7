// src/analysis/normalizer.rs

/// Join the non-empty fields with a single space and lower-case the result.
pub fn normalize<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
