//! Prompt construction and answer generation.
//!
//! The prompt template is fixed; `{context}` and `{question}` are the only
//! fields, substituted by a typed function rather than ad-hoc string
//! replacement. The model is instructed to say "answer is not available in
//! the context" when the context does not contain the answer; that
//! phrasing is not enforced locally — the model output is returned
//! verbatim.

use anyhow::Result;

use crate::generate::Generator;

/// Render the fixed question-answering prompt.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question as detailed as possible from the provided context.\n\
         If the answer is not in the provided context, say \"answer is not available in the context\".\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}

/// Answer a question from the retrieved context chunks.
///
/// Chunks are joined with blank lines into one context block; the model's
/// output is returned verbatim. Service failures propagate to the caller.
pub async fn answer(
    generator: &dyn Generator,
    question: &str,
    context_chunks: &[String],
) -> Result<String> {
    let context = context_chunks.join("\n\n");
    let prompt = build_prompt(&context, question);
    generator.generate(&prompt).await
}
