use bytes::Bytes;

use super::{
    error::{Error, Result},
    headers::Headers,
    request::Request,
};

const CRLF: &[u8] = b"\r\n";
const TERMINATOR: &[u8] = b"\r\n\r\n";

/// Try to extract exactly one request from the front of `buf`.
///
/// On success returns the request and the number of bytes it occupied. The
/// function keeps no state between calls: when it reports
/// [`Error::Incomplete`], keep the buffer as is and call again once more
/// bytes have arrived. For the other errors [`Error::consumed`] tells how many
/// bytes to drop before resynchronizing.
pub fn decode(buf: &[u8]) -> Result<(Request, usize)> {
    let head_end = find(buf, TERMINATOR).ok_or(Error::Incomplete)?;
    let body_start = head_end + TERMINATOR.len();

    let invalid = || Error::InvalidPacket {
        consumed: body_start,
    };

    let lines = split_lines(&buf[..head_end]);
    if lines.len() < 2 {
        return Err(invalid());
    }

    let request_line = std::str::from_utf8(lines[0]).map_err(|_| invalid())?;
    let parts = request_line.split(' ').collect::<Vec<_>>();
    let [method, url, version] = parts.as_slice() else {
        return Err(invalid());
    };

    let mut headers = Headers::new();
    for line in &lines[1..] {
        if line.is_empty() {
            continue;
        }
        // Header values are kept verbatim, so they must be valid UTF-8.
        let line = std::str::from_utf8(line).map_err(|_| invalid())?;
        // Lines without a separator carry nothing we can use.
        if let Some((var, val)) = line.split_once(':') {
            headers.set(var.to_ascii_lowercase(), val);
        }
    }

    let content_length = match headers.get_opt("content-length") {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::ContentLength {
                value: value.to_string(),
                consumed: body_start,
            })?,
        None => 0,
    };

    let end = body_start
        .checked_add(content_length)
        .ok_or_else(|| Error::ContentLength {
            value: content_length.to_string(),
            consumed: body_start,
        })?;
    if buf.len() < end {
        return Err(Error::Incomplete);
    }

    let request = Request {
        method: method.to_ascii_lowercase(),
        url: url.to_ascii_lowercase(),
        version: version.to_ascii_lowercase(),
        headers,
        body: Bytes::copy_from_slice(&buf[body_start..end]),
    };

    Ok((request, end))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn split_lines(head: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut rest = head;
    while let Some(pos) = find(rest, CRLF) {
        lines.push(&rest[..pos]);
        rest = &rest[pos + CRLF.len()..];
    }
    lines.push(rest);
    lines
}
