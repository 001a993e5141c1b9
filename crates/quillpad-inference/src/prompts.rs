//! Fixed instruction templates for the generative workflows.
//!
//! Each workflow makes exactly one call with one of these templates; the
//! templates are the only place prompt text lives.

/// Prompt asking the text model for a thumbnail description of a notebook.
///
/// The output is fed directly into the image generation API.
pub fn thumbnail_description_prompt(name: &str) -> String {
    format!(
        "You are a creative and helpful AI assistant capable of generating \
         interesting thumbnail descriptions for my notes. Your output will be \
         fed into an image generation API to generate a thumbnail. The \
         description should be minimalistic and flat styled. Please generate \
         a thumbnail description for my notebook titled \"{}\".",
        name
    )
}

/// Prompt asking the text model to summarize extracted note text.
pub fn summarize_prompt(text: &str) -> String {
    format!(
        "Provide a concise summary (2-3 sentences, under 200 words) of the \
         following text:\n\n{}",
        text
    )
}

/// Prompt asking the text model to complete a fragment of note text.
pub fn completion_prompt(prompt: &str) -> String {
    format!(
        "Complete the following text in a short and concise way: ##{}##",
        prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_prompt_embeds_name() {
        let prompt = thumbnail_description_prompt("Trip Plan");
        assert!(prompt.contains("\"Trip Plan\""));
        assert!(prompt.contains("image generation API"));
    }

    #[test]
    fn test_summarize_prompt_appends_text() {
        let prompt = summarize_prompt("the extracted body");
        assert!(prompt.ends_with("the extracted body"));
        assert!(prompt.contains("concise summary"));
    }

    #[test]
    fn test_completion_prompt_delimits_input() {
        let prompt = completion_prompt("Once upon a");
        assert!(prompt.contains("##Once upon a##"));
    }
}
