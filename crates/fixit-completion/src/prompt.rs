/// Instructions sent ahead of the detected text on every fallback call.
/// The four section headers are what the UI and the cache expect back.
const TEMPLATE: &str = "You are a technical troubleshooting assistant.

Your task:
1. Identify what the error message is about. Sometimes the message is not an error; in that case say so, explain why, and stop.
2. Explain the root cause in simple technical terms.
3. Provide clear, step-by-step instructions to fix the issue.
4. If multiple solutions exist, list them from safest to most advanced.
5. Do NOT include unnecessary theory.
6. Assume the user is a student with basic computer knowledge.

Output format MUST be:

ERROR SUMMARY:
<short explanation>

POSSIBLE CAUSES:
- cause 1
- cause 2

STEP-BY-STEP FIX:
1. Step one
2. Step two
3. Step three

WARNINGS (if any):
- warning
";

pub fn build_prompt(text: &str) -> String {
    format!("{TEMPLATE}\nThe following error was detected: {}.", text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_has_sections_and_text() {
        let prompt = build_prompt("  Disk full on C:\n");

        for section in [
            "ERROR SUMMARY:",
            "POSSIBLE CAUSES:",
            "STEP-BY-STEP FIX:",
            "WARNINGS (if any):",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.ends_with("The following error was detected: Disk full on C:."));
    }
}
