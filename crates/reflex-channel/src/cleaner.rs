//! Payload cleaning – stripping transport framing from raw inbound text.
//!
//! Payloads cross two framing layers before they are clause text:
//!
//! 1. an addressee prefix (`turtlebot_5000:…`) used by the broker to route
//!    the message to one agent, and
//! 2. the relay proxy's atom-safe escaping, which substitutes a single
//!    upper-case letter for each character that is significant to the clause
//!    grammar and wraps the result in a `redis(…)` envelope.
//!
//! [`CleanerChain::standard`] undoes both, in that order. Cleaning is total:
//! a payload that carries neither layer passes through unchanged.

/// Removes transport-specific wrapping from a raw payload.
pub trait PayloadCleaner: Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

/// Strips a leading `addressee:` routing prefix.
///
/// The prefix must be a bare word (letters, digits, underscores); anything
/// else before the first `:` means the payload is not framed and is returned
/// untouched, modulo trimming.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressedFrame;

impl PayloadCleaner for AddressedFrame {
    fn clean(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if let Some((prefix, rest)) = trimmed.split_once(':') {
            let is_addressee =
                !prefix.is_empty() && prefix.chars().all(|c| c.is_alphanumeric() || c == '_');
            if is_addressee {
                return rest.trim().to_string();
            }
        }
        trimmed.to_string()
    }
}

/// Undoes the relay proxy's atom-safe escaping.
///
/// The proxy substitutes one upper-case letter per grammar-significant
/// character and wraps the payload in `redis(…)`. Payload atoms are
/// lower-case by convention, so the substitution letters are unambiguous on
/// the way back. A payload without the `redis(…)` envelope is returned
/// unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicTransport;

impl AtomicTransport {
    fn unescape(escaped: &str) -> String {
        escaped
            .chars()
            .map(|c| match c {
                'A' => '(',
                'B' => ')',
                'C' => '[',
                'D' => ']',
                'E' => '.',
                'F' => ',',
                'G' => '/',
                'H' => '\\',
                'I' => '\'',
                'O' => ' ',
                'J' => ':',
                other => other,
            })
            .collect()
    }
}

impl PayloadCleaner for AtomicTransport {
    fn clean(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        match trimmed
            .strip_prefix("redis(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => Self::unescape(inner),
            None => trimmed.to_string(),
        }
    }
}

/// Applies a sequence of cleaners in order.
pub struct CleanerChain {
    cleaners: Vec<Box<dyn PayloadCleaner>>,
}

impl CleanerChain {
    pub fn new(cleaners: Vec<Box<dyn PayloadCleaner>>) -> Self {
        Self { cleaners }
    }

    /// The full inbound chain: addressee strip, then transport unescape.
    pub fn standard() -> Self {
        Self::new(vec![Box::new(AddressedFrame), Box::new(AtomicTransport)])
    }
}

impl PayloadCleaner for CleanerChain {
    fn clean(&self, raw: &str) -> String {
        self.cleaners
            .iter()
            .fold(raw.to_string(), |text, cleaner| cleaner.clean(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addressed_frame_strips_prefix() {
        let cleaned = AddressedFrame.clean("turtlebot_5000: vision(green,near).");
        assert_eq!(cleaned, "vision(green,near).");
    }

    #[test]
    fn addressed_frame_leaves_unframed_payload() {
        // The first ':' here sits inside a quoted atom, not an addressee.
        let payload = "action(go, 'go:5').";
        assert_eq!(AddressedFrame.clean(payload), payload);
    }

    #[test]
    fn atomic_transport_unescapes_wrapped_payload() {
        let cleaned = AtomicTransport.clean("redis(visionAgreenFnearBEOdepthAfarBE)");
        assert_eq!(cleaned, "vision(green,near). depth(far).");
    }

    #[test]
    fn atomic_transport_restores_quotes_and_colons() {
        let cleaned = AtomicTransport.clean("redis(agentnameAI5000JIBE)");
        assert_eq!(cleaned, "agentname('5000:').");
    }

    #[test]
    fn atomic_transport_leaves_unwrapped_payload() {
        let payload = "depth(near).";
        assert_eq!(AtomicTransport.clean(payload), payload);
    }

    #[test]
    fn standard_chain_undoes_both_layers() {
        let raw = "turtlebot_5000:redis(loadAfullBE)";
        assert_eq!(CleanerChain::standard().clean(raw), "load(full).");
    }

    #[test]
    fn standard_chain_is_total_on_plain_clause_text() {
        let raw = "  vision(red,center). depth(far).  ";
        assert_eq!(
            CleanerChain::standard().clean(raw),
            "vision(red,center). depth(far)."
        );
    }
}
