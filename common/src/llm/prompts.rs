use serde_json::{json, Value};

pub static DOCUMENT_QUERY_SYSTEM_PROMPT: &str = r"You are a careful legal research assistant.
You receive one document and a question about it.

1. Decide whether the document contains information that helps answer the question.
2. If it does not, set is_irrelevant to true, leave content empty and explain briefly in reasoning.
3. If it does, set is_irrelevant to false, answer the question in content using only the document, and explain in reasoning which passages support the answer.

Never invent clauses, parties, dates or amounts that are not present in the document.";

pub fn document_query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": { "type": "string" },
            "reasoning": { "type": "string" },
            "is_irrelevant": { "type": "boolean" }
        },
        "required": ["content", "reasoning", "is_irrelevant"],
        "additionalProperties": false
    })
}

pub fn create_user_message(prompt: &str, document_name: &str, document: &str) -> String {
    format!(
        r"
        Document ({document_name}):
        ==================
        {document}

        Question:
        ==================
        {prompt}
        "
    )
}
