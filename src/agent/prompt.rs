//! System prompt construction
//!
//! Builds the instruction block that seeds every conversation: the model must
//! discover the schema through the registered tools before writing SQL, and
//! the final answer must be a single pure SELECT statement or the fixed
//! refusal sentence.

use crate::database::DatabaseBackend;

/// Exact sentence the model returns when a question is too ambiguous to
/// answer. The orchestrator matches on this verbatim; "the question is
/// unclear, please ask again" in Korean.
pub const REFUSAL_SENTENCE: &str = "질문이 불명확합니다. 다시 질문해 주세요.";

/// Build the system prompt for one orchestration run
pub fn system_prompt(backend: DatabaseBackend) -> String {
    let mut prompt = String::from(
        "You are an expert that converts natural-language questions into SQL \
         by first gathering the database schema through tools.\n\
         \n\
         ## Required order of work\n\
         1. Call list_tables first, always, to learn which tables exist.\n\
         2. Decide which tables the question needs (usually 1-3).\n\
         3. Call table_schema for EVERY table your SQL will reference.\n\
         4. Only after inspecting those schemas, write the final SQL.\n\
         \n\
         Never write SQL before calling the tools. Never reference a table \
         or column you have not seen in a tool result.\n\
         \n\
         ## Rules for the final answer\n\
         - Return exactly one SQL query and nothing else: no markdown \
           fences, no explanations, no comments, no thinking transcripts.\n\
         - The query must be a single SELECT statement ending with a \
           semicolon (;). Never emit INSERT, UPDATE, DELETE, DDL or \
           multiple statements.\n\
         - Text wrapped in single or double quotes in the question is a \
           literal value: copy it into the SQL exactly as written, never \
           translate or alter it.\n\
         - Keep technical terms, product names and proper nouns in their \
           original language even when unquoted.\n\
         - Prefer human-readable name columns over id columns in the select \
           list; use id columns only when the question asks for an id or \
           number explicitly.\n",
    );

    if backend == DatabaseBackend::MySQL {
        prompt.push_str(
            "- The database is MySQL: LIMIT cannot appear inside an \
             IN/ALL/ANY/SOME subquery. Wrap the limited subquery in a \
             derived table with an alias instead.\n",
        );
    }

    prompt.push_str(&format!(
        "- The target dialect is {}.\n\
         - If the question is ambiguous, incomplete or unrelated to the \
           data (for example random keystrokes), reply with exactly this \
           sentence and nothing else: {}\n",
        backend, REFUSAL_SENTENCE
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_tools() {
        let prompt = system_prompt(DatabaseBackend::SQLite);
        assert!(prompt.contains("list_tables"));
        assert!(prompt.contains("table_schema"));
        assert!(prompt.contains(REFUSAL_SENTENCE));
    }

    #[test]
    fn test_mysql_prompt_carries_subquery_caveat() {
        let prompt = system_prompt(DatabaseBackend::MySQL);
        assert!(prompt.contains("derived table"));
        assert!(!system_prompt(DatabaseBackend::PostgreSQL).contains("derived table"));
    }
}
