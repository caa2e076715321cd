use crate::model::RuleChangeRecord;
use crate::render::{EmptyState, ListRenderer};
use crate::util::escape_html;

pub const EMPTY_RULE_CHANGES: EmptyState = EmptyState {
    title: "Nu există modificări de regulament",
    hint: None,
};

pub fn card(change: &RuleChangeRecord) -> String {
    let important = if change.important { " important" } else { "" };
    let reference = change
        .rule_reference
        .as_deref()
        .map(|r| format!(r#"<span class="rule-reference">Regula {}</span>"#, escape_html(r)))
        .unwrap_or_default();
    format!(
        r#"<div class="rule-update-card{important}" data-id="{}"><div class="rule-update-meta"><span class="category-badge {}">{}</span><time datetime="{}">{}</time>{reference}</div><h3>{}</h3><p>{}</p></div>"#,
        escape_html(&change.id),
        change.category.as_str(),
        change.category.label(),
        escape_html(&change.date),
        escape_html(&change.date_text),
        escape_html(&change.title),
        escape_html(&change.content)
    )
}

pub const fn list() -> ListRenderer<RuleChangeRecord> {
    ListRenderer::new(EMPTY_RULE_CHANGES, card)
}

/// Public card followed by edit and delete actions.
pub fn admin_card(change: &RuleChangeRecord) -> String {
    let id = escape_html(&change.id);
    format!(
        r#"<div class="admin-rule-update" data-id="{id}">{}<div class="update-actions"><button class="btn btn-icon" data-action="edit" data-id="{id}" title="Editează">✎</button><button class="btn btn-icon danger" data-action="delete" data-id="{id}" title="Șterge">✕</button></div></div>"#,
        card(change)
    )
}

pub const fn admin_list() -> ListRenderer<RuleChangeRecord> {
    ListRenderer::new(EMPTY_RULE_CHANGES, admin_card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleChangeCategory;

    #[test]
    fn card_shows_label_reference_and_flag() {
        let change = RuleChangeRecord {
            id: "rule-update-1".into(),
            date: "2025-02-01".into(),
            date_text: "1 Februarie 2025".into(),
            title: "Power gaming".into(),
            category: RuleChangeCategory::Noua,
            content: "Interzis".into(),
            rule_reference: Some("2.4".into()),
            important: true,
        };
        let html = card(&change);
        assert!(html.contains("rule-update-card important"));
        assert!(html.contains(r#"<span class="category-badge noua">Regulă Nouă</span>"#));
        assert!(html.contains("Regula 2.4"));
    }

    #[test]
    fn admin_card_carries_actions() {
        let change = RuleChangeRecord {
            id: "rule-update-7".into(),
            date: "2025-03-01".into(),
            date_text: "1 Martie 2025".into(),
            title: "Clarificare RDM".into(),
            category: RuleChangeCategory::Clarificare,
            content: "Detalii".into(),
            rule_reference: None,
            important: false,
        };
        let html = admin_card(&change);
        assert!(html.contains("Clarificare RDM"));
        assert!(html.contains(r#"data-action="edit" data-id="rule-update-7""#));
        assert!(html.contains(r#"data-action="delete" data-id="rule-update-7""#));
        assert!(!card(&change).contains("data-action"));
    }

    #[test]
    fn card_without_reference_omits_it() {
        let change = RuleChangeRecord {
            id: "r".into(),
            date: String::new(),
            date_text: String::new(),
            title: String::new(),
            category: RuleChangeCategory::Stergere,
            content: String::new(),
            rule_reference: None,
            important: false,
        };
        assert!(!card(&change).contains("rule-reference"));
    }
}
