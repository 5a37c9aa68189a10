use logsieve_types::ParsedLogEntry;

/// Parser for access log lines of the shape
/// `<host> - <user> [<timestamp>] "<request-line>" <status> ...`
pub struct LogParser;

/// Fields following the bracketed timestamp
struct RequestTail<'a> {
    request_line: &'a str,
    status_code: &'a str,
}

impl LogParser {
    /// Parse a raw log line, returning `None` if it does not have the expected shape.
    ///
    /// The fields may start anywhere in the line: the first token from which
    /// the whole shape matches is taken as the host, so leading whitespace or
    /// a prefix such as a syslog tag is skipped. Anything after the status
    /// code is ignored. The timestamp text is not interpreted here.
    pub fn parse(raw: &str) -> Option<ParsedLogEntry> {
        Self::token_starts(raw).find_map(|start| Self::parse_from(raw, &raw[start..]))
    }

    /// Match the fields from the start of `line`, a suffix of `raw`
    fn parse_from(raw: &str, line: &str) -> Option<ParsedLogEntry> {
        let (remote_host, rest) = Self::take_token(line)?;
        let rest = rest.strip_prefix(" - ")?;
        let (authenticated_user, rest) = Self::take_token(rest)?;
        let rest = rest.strip_prefix(" [")?;

        // The timestamp ends at the first ']' that leaves a well-formed tail
        for (close, _) in rest.match_indices(']') {
            let Some(tail) = Self::parse_tail(&rest[close + 1..]) else {
                continue;
            };

            return Some(ParsedLogEntry {
                raw: raw.to_string(),
                remote_host: remote_host.to_string(),
                authenticated_user: authenticated_user.to_string(),
                timestamp_text: rest[..close].to_string(),
                request_line: tail.request_line.to_string(),
                http_method: Self::method_of(tail.request_line).to_string(),
                status_code: tail.status_code.to_string(),
            });
        }

        None
    }

    /// Parse ` "<request-line>" <status>` from the start of `s`
    fn parse_tail(s: &str) -> Option<RequestTail<'_>> {
        let rest = s.strip_prefix(" \"")?;

        // Same rule for the request line: first closing quote followed by a status
        for (close, _) in rest.match_indices('"') {
            let Some(after) = rest[close + 1..].strip_prefix(' ') else {
                continue;
            };
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                continue;
            }
            return Some(RequestTail {
                request_line: &rest[..close],
                status_code: &after[..digits],
            });
        }

        None
    }

    /// Byte offsets where a non-whitespace run begins.
    ///
    /// Starting inside a run always yields the same host end as starting at
    /// its first character, so only run starts need trying.
    fn token_starts(s: &str) -> impl Iterator<Item = usize> + '_ {
        let mut after_space = true;
        s.char_indices().filter_map(move |(i, c)| {
            let starts = after_space && !c.is_whitespace();
            after_space = c.is_whitespace();
            starts.then_some(i)
        })
    }

    /// Split off a non-empty run of non-whitespace characters
    fn take_token(s: &str) -> Option<(&str, &str)> {
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        if end == 0 {
            return None;
        }
        Some(s.split_at(end))
    }

    /// Longest leading run of non-whitespace characters (may be empty)
    fn method_of(request_line: &str) -> &str {
        let end = request_line
            .find(char::is_whitespace)
            .unwrap_or(request_line.len());
        &request_line[..end]
    }
}
