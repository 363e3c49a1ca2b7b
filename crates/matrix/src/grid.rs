//! The style × prompt grid built from one bulk read of the record store.

use std::collections::{BTreeMap, BTreeSet};

use artgrid_core::cache::CachePayload;
use artgrid_core::remap::RemapTable;
use artgrid_db::models::image_record::ImageRecord;
use serde::{Deserialize, Serialize};

/// Grid payload: `matrix[artist][prompt]` is a public URL or `null`.
///
/// `artists` and `prompts` are the distinct axis values, descending. Maps are
/// ordered so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixPayload {
    pub matrix: BTreeMap<String, BTreeMap<String, Option<String>>>,
    pub artists: Vec<String>,
    pub prompts: Vec<String>,
}

impl MatrixPayload {
    /// URL of one cell, if resolved.
    pub fn cell(&self, artist: &str, prompt: &str) -> Option<&str> {
        self.matrix.get(artist)?.get(prompt)?.as_deref()
    }

    pub fn resolved_cells(&self) -> usize {
        self.matrix
            .values()
            .flat_map(|row| row.values())
            .filter(|url| url.is_some())
            .count()
    }
}

impl CachePayload for MatrixPayload {
    fn has_resolved_link(&self) -> bool {
        self.matrix.values().flat_map(|row| row.values()).any(|url| {
            url.as_deref()
                .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"))
        })
    }
}

/// Join `records` (in id order) with `remap`.
///
/// Every (artist, prompt) pair gets a cell. When a pair was recorded more
/// than once the earliest record wins.
pub fn build_matrix(records: &[ImageRecord], remap: &RemapTable) -> MatrixPayload {
    let artists: BTreeSet<&str> = records.iter().map(|r| r.artist_prompt.as_str()).collect();
    let prompts: BTreeSet<&str> = records.iter().map(|r| r.prompt_text.as_str()).collect();

    let mut matrix: BTreeMap<String, BTreeMap<String, Option<String>>> = artists
        .iter()
        .map(|artist| {
            let row = prompts.iter().map(|p| (p.to_string(), None)).collect();
            (artist.to_string(), row)
        })
        .collect();

    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert((record.artist_prompt.as_str(), record.prompt_text.as_str())) {
            continue;
        }
        if let Some(cell) = matrix
            .get_mut(&record.artist_prompt)
            .and_then(|row| row.get_mut(&record.prompt_text))
        {
            *cell = remap.resolve(&record.image_path).map(str::to_string);
        }
    }

    MatrixPayload {
        matrix,
        artists: artists.iter().rev().map(|s| s.to_string()).collect(),
        prompts: prompts.iter().rev().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use artgrid_core::remap::RemapSource;

    use super::*;

    fn record(id: i64, path: &str, artist: &str, prompt: &str) -> ImageRecord {
        ImageRecord {
            id,
            image_path: path.into(),
            artist_file: "artists.csv".into(),
            artist_prompt: artist.into(),
            prompt_file: "prompts.csv".into(),
            prompt_text: prompt.into(),
            combined_prompt: format!("q,{artist},{prompt}"),
            generation_time: None,
        }
    }

    fn remap(pairs: &[(&str, &str)]) -> RemapTable {
        RemapTable {
            source: Some(RemapSource::Production),
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn axes_are_descending_and_every_pair_has_a_cell() {
        let records = vec![
            record(1, "a.webp", "Monet", "a cat"),
            record(2, "b.webp", "van Gogh", "a dog"),
        ];
        let payload = build_matrix(&records, &RemapTable::default());

        assert_eq!(payload.artists, vec!["van Gogh", "Monet"]);
        assert_eq!(payload.prompts, vec!["a dog", "a cat"]);
        assert_eq!(payload.matrix.len(), 2);
        assert!(payload.matrix.values().all(|row| row.len() == 2));
        assert_eq!(payload.resolved_cells(), 0);
        assert!(!payload.has_resolved_link());
    }

    #[test]
    fn cells_resolve_through_remap() {
        let records = vec![
            record(1, "a.webp", "Monet", "a cat"),
            record(2, "b.webp", "Monet", "a dog"),
        ];
        let payload = build_matrix(&records, &remap(&[("a.webp", "https://cdn/a.webp")]));

        assert_eq!(payload.cell("Monet", "a cat"), Some("https://cdn/a.webp"));
        assert_eq!(payload.cell("Monet", "a dog"), None);
        assert!(payload.has_resolved_link());
    }

    #[test]
    fn earliest_record_wins_for_duplicate_cells() {
        let records = vec![
            record(1, "first.webp", "Monet", "a cat"),
            record(2, "second.webp", "Monet", "a cat"),
        ];
        let payload = build_matrix(
            &records,
            &remap(&[
                ("first.webp", "https://cdn/first.webp"),
                ("second.webp", "https://cdn/second.webp"),
            ]),
        );
        assert_eq!(payload.cell("Monet", "a cat"), Some("https://cdn/first.webp"));
    }

    #[test]
    fn non_url_values_are_not_links() {
        let records = vec![record(1, "a.webp", "Monet", "a cat")];
        let payload = build_matrix(&records, &remap(&[("a.webp", "/static/a.webp")]));
        assert_eq!(payload.resolved_cells(), 1);
        assert!(!payload.has_resolved_link());
    }
}
