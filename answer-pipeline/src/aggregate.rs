use crate::ChunkResult;

pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Join the original text of every relevant chunk, in document order.
///
/// Returns an empty string when no chunk is relevant.
pub fn aggregate(results: &[ChunkResult]) -> String {
    let mut relevant: Vec<&ChunkResult> = results
        .iter()
        .filter(|result| !result.is_irrelevant)
        .collect();
    relevant.sort_by_key(|result| result.chunk_id);

    relevant
        .iter()
        .map(|result| result.original_text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(chunk_id: usize, text: &str, is_irrelevant: bool) -> ChunkResult {
        ChunkResult {
            chunk_id,
            original_text: text.to_string(),
            content: if is_irrelevant {
                String::new()
            } else {
                format!("answer from {chunk_id}")
            },
            reasoning: String::new(),
            is_irrelevant,
        }
    }

    #[test]
    fn keeps_relevant_chunks_in_document_order() {
        let results = vec![
            result(0, "A. Lessee pays rent.", false),
            result(1, "B. Unrelated recital.", true),
            result(2, "C. Rent is due monthly.", false),
        ];

        assert_eq!(
            aggregate(&results),
            "A. Lessee pays rent.\n\nC. Rent is due monthly."
        );
    }

    #[test]
    fn order_follows_chunk_ids_not_slice_position() {
        let results = vec![
            result(2, "C.", false),
            result(0, "A.", false),
            result(1, "B.", true),
        ];

        assert_eq!(aggregate(&results), "A.\n\nC.");
    }

    #[test]
    fn uses_original_text_not_model_content() {
        let results = vec![result(0, "Original clause.", false)];

        assert_eq!(aggregate(&results), "Original clause.");
    }

    #[test]
    fn nothing_relevant_yields_empty_string() {
        let results = vec![result(0, "A.", true), result(1, "B.", true)];

        assert_eq!(aggregate(&results), "");
        assert_eq!(aggregate(&[]), "");
    }
}
