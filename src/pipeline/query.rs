//! Query rewriting for the upstream request.
//!
//! The client may pick a stylesheet with `xslFile=<name>`. That parameter is
//! meaningful only to this adapter, so it is removed before the query is
//! forwarded. Every other parameter is passed on verbatim and in order: no
//! decoding, no validation. Keys are decoded only to recognize `xslFile`,
//! the same way the HTTP layer decodes them when it reads the value.

/// Query parameter that selects the stylesheet.
pub const XSL_FILE_PARAM: &str = "xslFile";

/// The request URL with its query component removed.
///
/// This is what the error envelope echoes back in `<request>`.
pub fn base_url(request_url: &str) -> &str {
    request_url
        .split_once('?')
        .map_or(request_url, |(base, _)| base)
}

/// Build the query to send upstream from the raw incoming request URL.
///
/// Returns `None` when the URL carries no query, or when `xslFile` was the
/// only parameter.
pub fn upstream_query(request_url: &str) -> Option<String> {
    let (_, query) = request_url.split_once('?')?;

    let rewritten = query
        .split('&')
        .filter(|pair| !is_xsl_file_pair(pair))
        .collect::<Vec<_>>()
        .join("&");

    (!rewritten.is_empty()).then_some(rewritten)
}

fn is_xsl_file_pair(pair: &str) -> bool {
    url::form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == XSL_FILE_PARAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://adapter.example.org/oai/request";

    fn rewrite(query: &str) -> Option<String> {
        upstream_query(&format!("{BASE}?{query}"))
    }

    #[test]
    fn test_xsl_file_first() {
        assert_eq!(
            rewrite("xslFile=custom.xsl&verb=ListRecords&metadataPrefix=mods").as_deref(),
            Some("verb=ListRecords&metadataPrefix=mods")
        );
    }

    #[test]
    fn test_xsl_file_middle() {
        assert_eq!(
            rewrite("verb=ListRecords&xslFile=custom.xsl&metadataPrefix=mods").as_deref(),
            Some("verb=ListRecords&metadataPrefix=mods")
        );
    }

    #[test]
    fn test_xsl_file_last() {
        assert_eq!(
            rewrite("verb=ListRecords&metadataPrefix=mods&xslFile=custom.xsl").as_deref(),
            Some("verb=ListRecords&metadataPrefix=mods")
        );
    }

    #[test]
    fn test_xsl_file_sole_parameter() {
        assert_eq!(rewrite("xslFile=custom.xsl"), None);
    }

    #[test]
    fn test_other_parameters_untouched() {
        let query = "verb=GetRecord&identifier=oai%3Agupea%3A2077%2F1234&metadataPrefix=mods";
        assert_eq!(rewrite(query).as_deref(), Some(query));
    }

    #[test]
    fn test_similar_key_is_kept() {
        assert_eq!(
            rewrite("xslFileName=a&verb=Identify&myxslFile=b").as_deref(),
            Some("xslFileName=a&verb=Identify&myxslFile=b")
        );
    }

    #[test]
    fn test_no_query() {
        assert_eq!(upstream_query(BASE), None);
    }

    #[test]
    fn test_base_url_strips_query() {
        assert_eq!(base_url(&format!("{BASE}?verb=Identify&xslFile=a.xsl")), BASE);
        assert_eq!(base_url(BASE), BASE);
    }

    #[test]
    fn test_never_contains_param_for_any_position() {
        let others = ["verb=ListRecords", "metadataPrefix=mods", "set=com_2077_1", "from=2020-01-01"];
        for n in 0..=others.len() {
            for pos in 0..=n {
                let mut params: Vec<&str> = others[..n].to_vec();
                params.insert(pos, "xslFile=custom.xsl");
                let result = rewrite(&params.join("&")).unwrap_or_default();

                assert!(!result.contains(XSL_FILE_PARAM), "{result}");
                assert_eq!(result, others[..n].join("&"));
            }
        }
    }

    #[test]
    fn test_encoded_key_stripped() {
        assert_eq!(rewrite("verb=Identify&xsl%46ile=a.xsl").as_deref(), Some("verb=Identify"));
        // Encoded values elsewhere stay as sent.
        assert_eq!(
            rewrite("xsl%46ile=a.xsl&set=col%3A1").as_deref(),
            Some("set=col%3A1")
        );
    }
}
