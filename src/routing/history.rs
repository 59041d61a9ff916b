//! Browser-style path history under a deployment base path.

use std::sync::Mutex;

use crate::routing::router::normalize_path;

#[derive(Debug, Default)]
struct Stack {
    entries: Vec<String>,
    position: usize,
}

/// Path history rooted at a base path.
///
/// Entries are stored without the base; `href` adds it back for display.
#[derive(Debug)]
pub struct WebHistory {
    base: String,
    stack: Mutex<Stack>,
}

impl WebHistory {
    /// Create a history for `base_path` (`/`, `/app`, `/app/` are all accepted).
    pub fn new(base_path: &str) -> Self {
        let base = match normalize_path(base_path).as_str() {
            "/" => String::new(),
            other => other.to_string(),
        };
        Self {
            base,
            stack: Mutex::new(Stack::default()),
        }
    }

    /// Normalized base, empty when deployed at the root.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full href for an application path.
    pub fn href(&self, path: &str) -> String {
        format!("{}{}", self.base, normalize_path(path))
    }

    /// Remove the base from a location. Locations outside the base are kept as-is.
    pub fn strip_base<'a>(&self, location: &'a str) -> &'a str {
        if self.base.is_empty() {
            return location;
        }
        match location.strip_prefix(self.base.as_str()) {
            Some("") => "/",
            Some(rest) if rest.starts_with(['/', '?', '#']) => rest,
            _ => location,
        }
    }

    /// Record a new entry, dropping any forward entries.
    pub fn push(&self, path: &str) {
        let mut stack = self.lock();
        if !stack.entries.is_empty() {
            let keep = stack.position + 1;
            stack.entries.truncate(keep);
        }
        stack.entries.push(normalize_path(path));
        stack.position = stack.entries.len() - 1;
    }

    /// Overwrite the current entry.
    pub fn replace(&self, path: &str) {
        let mut stack = self.lock();
        let path = normalize_path(path);
        let position = stack.position;
        match stack.entries.get_mut(position) {
            Some(entry) => *entry = path,
            None => stack.entries.push(path),
        }
    }

    /// Entry one step back, without moving.
    pub fn peek_back(&self) -> Option<String> {
        let stack = self.lock();
        let position = stack.position.checked_sub(1)?;
        stack.entries.get(position).cloned()
    }

    /// Entry one step forward, without moving.
    pub fn peek_forward(&self) -> Option<String> {
        let stack = self.lock();
        stack.entries.get(stack.position + 1).cloned()
    }

    /// Step back one entry, returning the new current location.
    pub fn back(&self) -> Option<String> {
        let mut stack = self.lock();
        if stack.position == 0 {
            return None;
        }
        stack.position -= 1;
        stack.entries.get(stack.position).cloned()
    }

    /// Step forward one entry, returning the new current location.
    pub fn forward(&self) -> Option<String> {
        let mut stack = self.lock();
        if stack.position + 1 >= stack.entries.len() {
            return None;
        }
        stack.position += 1;
        stack.entries.get(stack.position).cloned()
    }

    /// Current location, if anything has been recorded.
    pub fn location(&self) -> Option<String> {
        let stack = self.lock();
        stack.entries.get(stack.position).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Stack> {
        self.stack.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_normalization() {
        assert_eq!(WebHistory::new("/").base(), "");
        assert_eq!(WebHistory::new("").base(), "");
        assert_eq!(WebHistory::new("/viewer/").base(), "/viewer");
        assert_eq!(WebHistory::new("viewer").base(), "/viewer");
    }

    #[test]
    fn test_href_and_strip() {
        let history = WebHistory::new("/viewer/");
        assert_eq!(history.href("/views/dem"), "/viewer/views/dem");
        assert_eq!(history.href("/"), "/viewer/");
        assert_eq!(history.strip_base("/viewer/views/dem"), "/views/dem");
        assert_eq!(history.strip_base("/viewer"), "/");
        assert_eq!(history.strip_base("/viewerx/drone"), "/viewerx/drone");
        assert_eq!(history.strip_base("/drone"), "/drone");
    }

    #[test]
    fn test_push_back_forward() {
        let history = WebHistory::new("/");
        assert!(history.is_empty());
        assert_eq!(history.back(), None);
        assert_eq!(history.peek_forward(), None);

        history.push("/");
        history.push("/drone");
        history.push("/dashboard");
        assert_eq!(history.peek_back().as_deref(), Some("/drone"));
        assert_eq!(history.location().as_deref(), Some("/dashboard"));
        assert_eq!(history.back().as_deref(), Some("/drone"));
        assert_eq!(history.back().as_deref(), Some("/"));
        assert_eq!(history.back(), None);
        assert_eq!(history.peek_back(), None);
        assert_eq!(history.peek_forward().as_deref(), Some("/drone"));
        assert_eq!(history.forward().as_deref(), Some("/drone"));

        history.push("/views/dem");
        assert_eq!(history.len(), 3);
        assert_eq!(history.forward(), None);
        assert_eq!(history.location().as_deref(), Some("/views/dem"));
    }

    #[test]
    fn test_replace() {
        let history = WebHistory::new("/");
        history.replace("/drone");
        assert_eq!(history.location().as_deref(), Some("/drone"));
        history.replace("/dashboard");
        assert_eq!(history.len(), 1);
        assert_eq!(history.location().as_deref(), Some("/dashboard"));
    }
}
