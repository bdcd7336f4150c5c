//! Prompt assembly
//!
//! Rendering is a pure function of the request and the filtered context, so
//! the same inputs always yield byte-identical prompts.

use crate::context::FilteredContext;

/// System instruction sent with every request
pub const SYSTEM_PROMPT: &str = r#"You translate requests into shell commands.

Rules:
- Output ONLY the raw command, exactly as it should be typed into a shell.
- No explanation, no preamble, no markdown, no code fences, no trailing commentary.
- Prefer a single command. Chain with && or pipes when needed.
- When the request implies creating a file, write a short script using a heredoc.
- Context (application, working directory, selected text) is advisory. Use it
  when it clarifies the request and ignore it when it does not.

Examples:

Request: find files larger than 100MB in the current directory
find . -type f -size +100M

Request: show the 5 most recent git commits on one line each
git log --oneline -5

Request: create a .gitignore for a Rust project
cat > .gitignore <<'EOF'
/target
Cargo.lock
**/*.rs.bk
EOF"#;

/// A fully rendered prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

/// Merge the request with whatever context survived filtering.
pub fn assemble(request: &str, context: &FilteredContext) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT,
        user: render_user(request, context),
    }
}

fn render_user(request: &str, context: &FilteredContext) -> String {
    let mut user = String::new();

    if !context.is_empty() {
        user.push_str("Context:\n");
        if let Some(app) = &context.foreground_app {
            user.push_str(&format!("Application: {}\n", app));
        }
        if let Some(dir) = &context.working_directory {
            user.push_str(&format!("Working directory: {}\n", dir));
        }
        if let Some(selection) = &context.selected_text {
            user.push_str(&format!("Selected text:\n\"\"\"\n{}\n\"\"\"\n", selection));
        }
        user.push('\n');
    }

    user.push_str("Request: ");
    user.push_str(request);
    user
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_only_without_context() {
        let prompt = assemble("find large files", &FilteredContext::default());
        assert_eq!(prompt.user, "Request: find large files");
        assert_eq!(prompt.system, SYSTEM_PROMPT);
    }

    #[test]
    fn test_context_block_precedes_request() {
        let context = FilteredContext {
            foreground_app: Some("Terminal".to_string()),
            working_directory: Some("~/project".to_string()),
            selected_text: None,
        };
        let prompt = assemble("grep for TODOs", &context);

        assert_eq!(
            prompt.user,
            "Context:\nApplication: Terminal\nWorking directory: ~/project\n\nRequest: grep for TODOs"
        );
    }

    #[test]
    fn test_selection_rendered_as_block() {
        let context = FilteredContext {
            selected_text: Some("Cargo.lock\nsrc/main.rs".to_string()),
            ..Default::default()
        };
        let prompt = assemble("delete these", &context);

        assert!(prompt.user.starts_with("Context:\nSelected text:\n\"\"\"\nCargo.lock\nsrc/main.rs\n\"\"\"\n"));
        assert!(prompt.user.ends_with("\n\nRequest: delete these"));
        assert!(!prompt.user.contains("Application:"));
    }

    #[test]
    fn test_field_order_is_fixed() {
        let context = FilteredContext {
            selected_text: Some("sel".to_string()),
            foreground_app: Some("Zed".to_string()),
            working_directory: Some("/srv".to_string()),
        };
        let user = assemble("x", &context).user;

        let app = user.find("Application:").unwrap();
        let dir = user.find("Working directory:").unwrap();
        let sel = user.find("Selected text:").unwrap();
        let req = user.find("Request:").unwrap();
        assert!(app < dir && dir < sel && sel < req);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let context = FilteredContext {
            selected_text: Some("a b c".to_string()),
            foreground_app: Some("kitty".to_string()),
            working_directory: Some("~".to_string()),
        };
        let first = assemble("list ports in use", &context);
        let second = assemble("list ports in use", &context);
        assert_eq!(first, second);
    }
}
