//! Stable identifiers for directive types, keywords and report fields.
//!
//! Directive types are lowercase CSP names. Report keys are lowercase JSON field names as sent by
//! browsers after key renaming.

// Directive types
pub const BASE_URI: &str = "base-uri";
pub const CHILD_SRC: &str = "child-src";
pub const CONNECT_SRC: &str = "connect-src";
pub const DEFAULT_SRC: &str = "default-src";
pub const FONT_SRC: &str = "font-src";
pub const FORM_ACTION: &str = "form-action";
pub const FRAME_ANCESTORS: &str = "frame-ancestors";
pub const FRAME_SRC: &str = "frame-src";
pub const IMG_SRC: &str = "img-src";
pub const MEDIA_SRC: &str = "media-src";
pub const OBJECT_SRC: &str = "object-src";
pub const SCRIPT_SRC: &str = "script-src";
pub const STYLE_SRC: &str = "style-src";

// Legacy / non-whitelist directive types
pub const XHR_SRC: &str = "xhr-src";
pub const PLUGIN_TYPES: &str = "plugin-types";
pub const REFERRER_DIRECTIVE: &str = "referrer";
pub const REFLECTED_XSS: &str = "reflected-xss";
pub const REPORT_URI: &str = "report-uri";
pub const SANDBOX: &str = "sandbox";

// Source expression keywords (compared case-insensitively)
pub const KEYWORD_SELF: &str = "'self'";
pub const KEYWORD_UNSAFE_INLINE: &str = "'unsafe-inline'";
pub const KEYWORD_UNSAFE_EVAL: &str = "'unsafe-eval'";
pub const KEYWORD_NONE: &str = "'none'";

// Violated-directive phrases sent by one browser family
pub const PHRASE_INLINE_STYLE_BASE_RESTRICTION: &str = "inline style base restriction";
pub const PHRASE_INLINE_SCRIPT_BASE_RESTRICTION: &str = "inline script base restriction";
pub const PHRASE_EVAL_SCRIPT_BASE_RESTRICTION: &str = "eval script base restriction";

// Report fields
pub const KEY_BLOCKED_URI: &str = "blocked-uri";
pub const KEY_DOCUMENT_URI: &str = "document-uri";
pub const KEY_DOCUMENT_URL: &str = "document-url";
pub const KEY_REFERRER: &str = "referrer";
pub const KEY_VIOLATED_DIRECTIVE: &str = "violated-directive";
pub const KEY_ORIGINAL_POLICY: &str = "original-policy";

// Log entry fields
pub const KEY_CSP_REPORT: &str = "csp-report";
pub const KEY_POLICY_TYPE: &str = "policy-type";
pub const KEY_REMOTE_ADDR: &str = "remote-addr";
pub const KEY_HTTP_USER_AGENT: &str = "http-user-agent";
pub const KEY_TIMESTAMP_UTC: &str = "timestamp-utc";
pub const KEY_HEADER_TYPE: &str = "header-type";

// Report types (value of `policy-type`)
pub const REPORT_TYPE_REGULAR: &str = "regular";
pub const REPORT_TYPE_EVAL: &str = "eval";
pub const REPORT_TYPE_INLINE: &str = "inline";

/// Value used by some browsers in place of the document URI.
pub const SELF_URI_VALUE: &str = "self";
