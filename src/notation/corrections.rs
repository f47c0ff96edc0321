//! Correction fixers for near-miss variant strings
//!
//! Each fixer repairs one common input mistake and returns `None` when it
//! has nothing to change. [`suggest`] keeps only the repaired strings that
//! actually parse.

use crate::variant::VariantId;

/// A named single-purpose correction
pub struct Fixer {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<String>,
}

/// Fixers in the order their suggestions are offered
pub const FIXERS: &[Fixer] = &[
    Fixer {
        name: "whitespace",
        apply: fix_whitespace,
    },
    Fixer {
        name: "unicode_punctuation",
        apply: fix_unicode_punctuation,
    },
    Fixer {
        name: "missing_colon",
        apply: fix_missing_colon,
    },
    Fixer {
        name: "missing_dot",
        apply: fix_missing_dot,
    },
    Fixer {
        name: "case",
        apply: fix_case,
    },
    Fixer {
        name: "rsid_prefix",
        apply: fix_rsid_prefix,
    },
    Fixer {
        name: "vcf_separators",
        apply: fix_vcf_separators,
    },
    Fixer {
        name: "chr_prefix",
        apply: fix_chr_prefix,
    },
];

fn changed(input: &str, output: String) -> Option<String> {
    if output == input {
        None
    } else {
        Some(output)
    }
}

fn is_punct(c: char) -> bool {
    matches!(c, ':' | '.' | '>' | '_' | '+' | '-' | '*')
}

/// Trim, drop whitespace next to punctuation, collapse the rest
pub fn fix_whitespace(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let mut out = String::with_capacity(trimmed.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let run_end = (i..chars.len())
                .find(|&j| !chars[j].is_whitespace())
                .unwrap_or(chars.len());
            let before = out.chars().last();
            let after = chars.get(run_end).copied();
            if !before.is_some_and(is_punct) && !after.is_some_and(is_punct) {
                out.push(' ');
            }
            i = run_end;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    changed(input, out)
}

/// Unicode dashes, arrows and full-width punctuation to ASCII
pub fn fix_unicode_punctuation(input: &str) -> Option<String> {
    let out: String = input
        .chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2192}' | '\u{27F6}' | '\u{FF1E}' => '>',
            '\u{FF1A}' => ':',
            '\u{FF0E}' => '.',
            other => other,
        })
        .collect();
    changed(input, out)
}

/// Insert `:` between a versioned accession and `c.`/`g.`/`n.`/`m.`/`p.`
pub fn fix_missing_colon(input: &str) -> Option<String> {
    if input.contains(':') {
        return None;
    }
    let chars: Vec<char> = input.chars().collect();
    let at = (1..chars.len().saturating_sub(1)).find(|&i| {
        chars[i - 1].is_ascii_digit()
            && matches!(chars[i].to_ascii_lowercase(), 'c' | 'g' | 'n' | 'm' | 'p')
            && chars[i + 1] == '.'
    })?;
    let mut out: String = chars[..at].iter().collect();
    out.push(':');
    out.extend(chars[at..].iter());
    Some(out)
}

/// Insert `.` after the coordinate type (`:c544` -> `:c.544`)
pub fn fix_missing_dot(input: &str) -> Option<String> {
    let (reference, change) = input.split_once(':')?;
    let mut chars = change.chars();
    let coordinate = chars.next()?;
    let next = chars.next()?;
    if !matches!(coordinate.to_ascii_lowercase(), 'c' | 'g' | 'n' | 'm' | 'p')
        || !(next.is_ascii_digit() || next == '-' || next == '*' || next.is_ascii_uppercase())
    {
        return None;
    }
    Some(format!("{}:{}.{}", reference, coordinate, &change[1..]))
}

/// Upper-case accessions and alleles, lower-case coordinate types and edit keywords
pub fn fix_case(input: &str) -> Option<String> {
    let out = match input.split_once(':') {
        Some((reference, change)) => {
            let mut out = reference.to_ascii_uppercase();
            out.push(':');
            let mut chars = change.chars();
            match (chars.next(), chars.next()) {
                (Some(coordinate), Some('.')) => {
                    let coordinate = coordinate.to_ascii_lowercase();
                    out.push(coordinate);
                    out.push('.');
                    let body = chars.as_str();
                    if coordinate == 'p' {
                        out.push_str(body);
                    } else {
                        out.push_str(&case_nucleotide_body(body));
                    }
                }
                _ => out.push_str(&change.to_ascii_uppercase()),
            }
            out
        }
        None => {
            let fields: Vec<&str> = input.split('-').collect();
            if fields.len() != 4 {
                return None;
            }
            format!(
                "{}-{}-{}-{}",
                fields[0],
                fields[1],
                fields[2].to_ascii_uppercase(),
                fields[3].to_ascii_uppercase()
            )
        }
    };
    changed(input, out)
}

/// Edit keywords share no letters with bases, so they can be told apart
/// after lower-casing.
fn case_nucleotide_body(body: &str) -> String {
    let lower = body.to_ascii_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut rest = lower.as_str();
    while let Some(c) = rest.chars().next() {
        if let Some(keyword) = ["del", "ins", "dup"]
            .into_iter()
            .find(|k| rest.starts_with(k))
        {
            out.push_str(keyword);
            rest = &rest[keyword.len()..];
        } else {
            out.push(c.to_ascii_uppercase());
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// `RS123`, `Rs 123`, `rs 123` -> `rs123`
pub fn fix_rsid_prefix(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.len() < 2 || !trimmed.is_char_boundary(2) {
        return None;
    }
    let (prefix, digits) = trimmed.split_at(2);
    if !prefix.eq_ignore_ascii_case("rs") {
        return None;
    }
    let digits = digits.trim_start();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    changed(input, format!("rs{}", digits))
}

/// Rewrite `:`, `_`, `>` and whitespace separators to `-`
///
/// `17:36459258 A>G` -> `17-36459258-A-G`. Strings with a `.` (accessions)
/// are left alone.
pub fn fix_vcf_separators(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.contains('.') {
        return None;
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut prev: Option<char> = None;
    for c in trimmed.chars() {
        let c = if matches!(c, ':' | '_' | '>' | '/') || c.is_whitespace() {
            '-'
        } else {
            c
        };
        // position directly followed by the reference allele
        if prev.is_some_and(|p| p.is_ascii_digit()) && "ACGTNacgtn".contains(c) {
            out.push('-');
        }
        if !(c == '-' && prev == Some('-')) {
            out.push(c);
        }
        prev = Some(c);
    }
    let out = strip_chr(&out).to_string();
    if out.split('-').count() != 4 {
        return None;
    }
    changed(input, out)
}

fn strip_chr(s: &str) -> &str {
    ["chr", "CHR", "Chr"]
        .into_iter()
        .find_map(|p| s.strip_prefix(p))
        .unwrap_or(s)
}

/// `chr17-...` -> `17-...`
pub fn fix_chr_prefix(input: &str) -> Option<String> {
    let trimmed = input.trim();
    changed(input, strip_chr(trimmed).to_string())
}

/// Candidate rewrites: each fixer alone, then all fixers chained
pub fn candidates(input: &str) -> Vec<String> {
    let mut out: Vec<String> = FIXERS
        .iter()
        .filter_map(|fixer| (fixer.apply)(input))
        .collect();
    let combined = FIXERS.iter().fold(input.to_string(), |acc, fixer| {
        (fixer.apply)(&acc).unwrap_or(acc)
    });
    if combined != input {
        out.push(combined);
    }
    out
}

/// Candidate rewrites that parse, most likely first, without duplicates
pub fn suggest(input: &str) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    for candidate in candidates(input) {
        if candidate == input.trim() || suggestions.contains(&candidate) {
            continue;
        }
        if VariantId::parse(&candidate).is_ok() {
            suggestions.push(candidate);
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_colon() {
        assert_eq!(
            fix_missing_colon("NM_000458.4c.544+1G>A").as_deref(),
            Some("NM_000458.4:c.544+1G>A")
        );
        assert_eq!(fix_missing_colon("NM_000458.4:c.544+1G>A"), None);
    }

    #[test]
    fn test_missing_dot() {
        assert_eq!(
            fix_missing_dot("NM_000458.4:c544+1G>A").as_deref(),
            Some("NM_000458.4:c.544+1G>A")
        );
        assert_eq!(fix_missing_dot("NM_000458.4:c.544+1G>A"), None);
    }

    #[test]
    fn test_case() {
        assert_eq!(
            fix_case("nm_000458.4:C.100_101delinsag").as_deref(),
            Some("NM_000458.4:c.100_101delinsAG")
        );
        assert_eq!(fix_case("17-100-a-g").as_deref(), Some("17-100-A-G"));
        assert_eq!(
            fix_case("NP_000449.1:p.Arg137Trp"),
            None,
            "protein descriptions keep their case"
        );
    }

    #[test]
    fn test_whitespace_and_unicode() {
        assert_eq!(
            fix_whitespace("  NM_000458.4 : c.544+1G > A ").as_deref(),
            Some("NM_000458.4:c.544+1G>A")
        );
        assert_eq!(
            fix_unicode_punctuation("17\u{2013}36459258\u{2013}A\u{2013}G").as_deref(),
            Some("17-36459258-A-G")
        );
        assert_eq!(
            fix_unicode_punctuation("NM_000458.4:c.544+1G\u{2192}A").as_deref(),
            Some("NM_000458.4:c.544+1G>A")
        );
    }

    #[test]
    fn test_rsid_prefix() {
        assert_eq!(fix_rsid_prefix("RS56116432").as_deref(), Some("rs56116432"));
        assert_eq!(fix_rsid_prefix("rs 56116432").as_deref(), Some("rs56116432"));
        assert_eq!(fix_rsid_prefix("rs56116432"), None);
        assert_eq!(fix_rsid_prefix("rsabc"), None);
    }

    #[test]
    fn test_vcf_separators() {
        assert_eq!(
            fix_vcf_separators("17:36459258:A:G").as_deref(),
            Some("17-36459258-A-G")
        );
        assert_eq!(
            fix_vcf_separators("chr17:36459258 A>G").as_deref(),
            Some("17-36459258-A-G")
        );
        assert_eq!(
            fix_vcf_separators("17_36459258_A_G").as_deref(),
            Some("17-36459258-A-G")
        );
        assert_eq!(fix_vcf_separators("NC_000017.11:36459257:A:G"), None);
    }

    #[test]
    fn test_suggest_combined_fix() {
        assert_eq!(
            suggest("nm_000458.4c.544+1g>a"),
            vec!["NM_000458.4:c.544+1G>A".to_string()]
        );
    }

    #[test]
    fn test_suggest_nothing_for_garbage() {
        assert!(suggest("BRCA1 mutation").is_empty());
    }

    #[test]
    fn test_non_ascii_coordinate_type() {
        assert_eq!(fix_case("a:\u{20ac}.x").as_deref(), Some("A:\u{20ac}.X"));
        assert_eq!(fix_missing_dot("NM_000458.4:\u{e7}544G>A"), None);
        for input in ["A:\u{20ac}.x", "NM_000458.4:\u{e9}.544G>A", "\u{20ac}\u{20ac}:c.1A>G"] {
            assert!(suggest(input).is_empty(), "{}", input);
        }
    }
}
