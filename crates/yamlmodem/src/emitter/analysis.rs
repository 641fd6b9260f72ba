//! What the emitter needs to know about an event before writing it.

use alloc::{string::String, vec::Vec};

use crate::{
    chars::{is_alpha, is_blankz, is_bom, is_break, is_printable},
    error::Error,
    event::{TagDirective, VersionDirective},
};

/// Anchor or alias name, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct AnchorAnalysis {
    pub(super) name: String,
    pub(super) alias: bool,
}

/// A tag split into a directive handle and a suffix. An empty handle means
/// the tag is written verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TagAnalysis {
    pub(super) handle: String,
    pub(super) suffix: String,
}

/// Which presentations a scalar value allows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub(super) struct ScalarAnalysis {
    pub(super) value: String,
    pub(super) multiline: bool,
    pub(super) flow_plain_allowed: bool,
    pub(super) block_plain_allowed: bool,
    pub(super) single_quoted_allowed: bool,
    pub(super) block_allowed: bool,
}

#[derive(Debug, Default)]
pub(super) struct Analysis {
    pub(super) anchor: Option<AnchorAnalysis>,
    pub(super) tag: Option<TagAnalysis>,
    pub(super) scalar: Option<ScalarAnalysis>,
}

pub(super) fn analyze_version_directive(version: VersionDirective) -> Result<(), Error> {
    if version.major != 1 || (version.minor != 1 && version.minor != 2) {
        return Err(Error::emitter("incompatible %YAML directive"));
    }
    Ok(())
}

pub(super) fn analyze_tag_directive(directive: &TagDirective) -> Result<(), Error> {
    let handle = directive.handle.as_str();
    if handle.is_empty() {
        return Err(Error::emitter("tag handle must not be empty"));
    }
    if !handle.starts_with('!') {
        return Err(Error::emitter("tag handle must start with '!'"));
    }
    if !handle.ends_with('!') {
        return Err(Error::emitter("tag handle must end with '!'"));
    }
    if handle.len() > 2 && !handle[1..handle.len() - 1].chars().all(is_alpha) {
        return Err(Error::emitter(
            "tag handle must contain alphanumerical characters only",
        ));
    }
    if directive.prefix.is_empty() {
        return Err(Error::emitter("tag prefix must not be empty"));
    }
    Ok(())
}

pub(super) fn analyze_anchor(name: &str, alias: bool) -> Result<AnchorAnalysis, Error> {
    if name.is_empty() {
        return Err(Error::emitter(if alias {
            "alias value must not be empty"
        } else {
            "anchor value must not be empty"
        }));
    }
    if !name.chars().all(is_alpha) {
        return Err(Error::emitter(if alias {
            "alias value must contain alphanumerical characters only"
        } else {
            "anchor value must contain alphanumerical characters only"
        }));
    }
    Ok(AnchorAnalysis {
        name: name.into(),
        alias,
    })
}

/// Splits `tag` on the first directive whose prefix it extends.
pub(super) fn analyze_tag(tag: &str, directives: &[TagDirective]) -> Result<TagAnalysis, Error> {
    if tag.is_empty() {
        return Err(Error::emitter("tag value must not be empty"));
    }
    for directive in directives {
        let prefix = directive.prefix.as_str();
        if prefix.len() < tag.len() && tag.starts_with(prefix) {
            return Ok(TagAnalysis {
                handle: directive.handle.clone(),
                suffix: tag[prefix.len()..].into(),
            });
        }
    }
    Ok(TagAnalysis {
        handle: String::new(),
        suffix: tag.into(),
    })
}

#[allow(clippy::too_many_lines)]
pub(super) fn analyze_scalar(value: &str, unicode: bool) -> ScalarAnalysis {
    if value.is_empty() {
        return ScalarAnalysis {
            value: String::new(),
            multiline: false,
            flow_plain_allowed: false,
            block_plain_allowed: true,
            single_quoted_allowed: true,
            block_allowed: false,
        };
    }

    let chars: Vec<char> = value.chars().collect();
    let at = |k: usize| chars.get(k).copied().unwrap_or('\0');

    let mut block_indicators = false;
    let mut flow_indicators = false;
    let mut line_breaks = false;
    let mut special_characters = false;

    let mut leading_space = false;
    let mut leading_break = false;
    let mut trailing_space = false;
    let mut trailing_break = false;
    let mut break_space = false;
    let mut space_break = false;

    let mut preceded_by_whitespace = true;
    let mut previous_space = false;
    let mut previous_break = false;

    if value.starts_with("---") || value.starts_with("...") {
        block_indicators = true;
        flow_indicators = true;
    }

    let last = chars.len() - 1;
    for (i, &ch) in chars.iter().enumerate() {
        let followed_by_whitespace = is_blankz(at(i + 1));
        if i == 0 {
            match ch {
                '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"'
                | '%' | '@' | '`' => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                '?' | ':' => {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                '-' if followed_by_whitespace => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                _ => {}
            }
        } else {
            match ch {
                ',' | '?' | '[' | ']' | '{' | '}' => flow_indicators = true,
                ':' => {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                '#' if preceded_by_whitespace => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                _ => {}
            }
        }

        if !is_printable(ch) || (!ch.is_ascii() && !unicode) || is_bom(ch) {
            special_characters = true;
        }
        if is_break(ch) {
            line_breaks = true;
        }

        if ch == ' ' {
            if i == 0 {
                leading_space = true;
            }
            if i == last {
                trailing_space = true;
            }
            if previous_break {
                break_space = true;
            }
            previous_space = true;
            previous_break = false;
        } else if is_break(ch) {
            if i == 0 {
                leading_break = true;
            }
            if i == last {
                trailing_break = true;
            }
            if previous_space {
                space_break = true;
            }
            previous_break = true;
            previous_space = false;
        } else {
            previous_space = false;
            previous_break = false;
        }

        preceded_by_whitespace = is_blankz(ch);
    }

    let mut analysis = ScalarAnalysis {
        value: value.into(),
        multiline: line_breaks,
        flow_plain_allowed: true,
        block_plain_allowed: true,
        single_quoted_allowed: true,
        block_allowed: true,
    };

    if leading_space || leading_break || trailing_space || trailing_break {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
    }
    if trailing_space {
        analysis.block_allowed = false;
    }
    if break_space {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
        analysis.single_quoted_allowed = false;
    }
    if space_break || special_characters {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
        analysis.single_quoted_allowed = false;
        analysis.block_allowed = false;
    }
    if line_breaks {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
    }
    if flow_indicators {
        analysis.flow_plain_allowed = false;
    }
    if block_indicators {
        analysis.block_plain_allowed = false;
    }
    analysis
}
