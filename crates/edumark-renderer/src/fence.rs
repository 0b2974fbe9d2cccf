//! Code fence tracking for line-based preprocessing.

/// Tracks whether a line-by-line scan is inside a fenced code block.
///
/// Fences use three or more backticks or tildes. The closing fence must use
/// the same character and be at least as long as the opening one.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed one line. Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            return false;
        }

        if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            return true;
        }
        false
    }
}

fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == expected).count();
    if count == 0 || count < min_len {
        return false;
    }
    // Fence chars are ASCII, so `count` is also a byte offset
    trimmed[count..].chars().all(char::is_whitespace)
}
