// DOM structure heuristics
// Additive rules over a page snapshot; each rule contributes at most once.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

use crate::models::scan::PageSnapshot;

lazy_static! {
    static ref TITLE_PHISH_PATTERN: Regex = Regex::new(
        r"(?i)\b(verify|login|signin|sign in|secure|account|update|confirm|validate|suspended|restricted|warning|alert|urgent)\b"
    )
    .expect("Invalid title pattern regex");

    static ref SUSPICIOUS_ACTION_PATTERN: Regex =
        Regex::new(r"(?i)(\.php$|action=|redirect=|/gate\.|/log\.|/submit\.php)")
            .expect("Invalid form action regex");
}

const TITLE_EXCERPT_CHARS: usize = 60;
const ACTION_EXCERPT_CHARS: usize = 80;

/// Score a page snapshot. Missing fields count as zero / empty.
pub fn analyze(snapshot: &PageSnapshot) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    let passwords = snapshot.num_password_fields.unwrap_or(0);
    let forms = snapshot.num_forms.unwrap_or(0);
    let iframes = snapshot.num_iframes.unwrap_or(0);
    let inputs = snapshot.num_inputs.unwrap_or(0);

    if passwords >= 2 {
        score += 0.35;
        reasons.push(format!("Multiple password fields detected ({})", passwords));
    } else if passwords == 1 {
        score += 0.25;
        reasons.push("Password field detected on page".to_string());
    }

    if forms > 3 {
        score += 0.25;
        reasons.push(format!("Excessive forms on page ({})", forms));
    } else if forms >= 2 {
        score += 0.15;
        reasons.push(format!("Multiple forms detected ({})", forms));
    }

    if iframes > 2 {
        score += 0.20;
        reasons.push(format!("Excessive iframes detected ({})", iframes));
    } else if iframes > 0 {
        score += 0.08;
        reasons.push(format!("Iframe(s) present on page ({})", iframes));
    }

    if inputs > 10 {
        score += 0.10;
        reasons.push(format!("Unusually high number of input fields ({})", inputs));
    }

    if let Some(title) = snapshot.title.as_deref().filter(|t| !t.is_empty()) {
        if TITLE_PHISH_PATTERN.is_match(title) {
            score += 0.15;
            reasons.push(format!(
                "Suspicious keywords in page title: \"{}\"",
                excerpt(title, TITLE_EXCERPT_CHARS)
            ));
        }
    }

    // first match only
    if let Some(action) = snapshot
        .form_actions
        .iter()
        .find(|action| SUSPICIOUS_ACTION_PATTERN.is_match(action))
    {
        score += 0.20;
        reasons.push(format!(
            "Suspicious form action target: {}",
            excerpt(action, ACTION_EXCERPT_CHARS)
        ));
    }

    (f64::min(score, 1.0), reasons)
}

fn excerpt(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

// =============================================================================
// HTML SNAPSHOTS
// =============================================================================

/// Derive a snapshot from raw page HTML
pub fn snapshot_from_html(html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);

    let count = |selector: &str| -> Option<u32> {
        let selector = Selector::parse(selector).ok()?;
        Some(document.select(&selector).count() as u32)
    };

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
    });

    let form_actions = Selector::parse("form")
        .map(|selector| {
            document
                .select(&selector)
                .filter_map(|form| form.value().attr("action"))
                .map(|action| action.trim().to_string())
                .filter(|action| !action.is_empty())
                .collect()
        })
        .unwrap_or_default();

    PageSnapshot {
        num_forms: count("form"),
        num_inputs: count("input"),
        num_password_fields: count(r#"input[type="password"]"#),
        num_iframes: count("iframe"),
        title,
        form_actions,
    }
}

/// Fill the gaps in `explicit` from `derived`; explicit values always win
pub fn merge_snapshots(explicit: PageSnapshot, derived: PageSnapshot) -> PageSnapshot {
    PageSnapshot {
        num_forms: explicit.num_forms.or(derived.num_forms),
        num_inputs: explicit.num_inputs.or(derived.num_inputs),
        num_password_fields: explicit.num_password_fields.or(derived.num_password_fields),
        num_iframes: explicit.num_iframes.or(derived.num_iframes),
        title: explicit.title.or(derived.title),
        form_actions: if explicit.form_actions.is_empty() {
            derived.form_actions
        } else {
            explicit.form_actions
        },
    }
}
