//! Rules page: header meta, table of contents and category sections.

use crate::model::{RuleCategory, RuleEntry};
use crate::render::{EmptyState, ListRenderer, ViewSink};
use crate::util::escape_html;

pub const EMPTY_RULES: EmptyState = EmptyState {
    title: "Nu s-au găsit reguli",
    hint: None,
};

const EMPTY_CATEGORY: &str = "Nu există reguli în această categorie încă.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// 1-based position.
    pub number: usize,
    pub anchor: String,
    pub label: String,
}

pub fn toc(categories: &[RuleCategory]) -> Vec<TocEntry> {
    categories
        .iter()
        .enumerate()
        .map(|(i, cat)| TocEntry {
            number: i + 1,
            anchor: cat.id.clone(),
            label: format!("{} {}", cat.icon, cat.name),
        })
        .collect()
}

pub fn toc_html(categories: &[RuleCategory]) -> String {
    toc(categories)
        .iter()
        .map(|e| {
            format!(
                r##"<a href="#{}" class="toc-item"><span class="toc-number">{}</span><span>{}</span></a>"##,
                escape_html(&e.anchor),
                e.number,
                escape_html(&e.label)
            )
        })
        .collect()
}

fn rule_html(rule: &RuleEntry) -> String {
    let important = if rule.important { " important" } else { "" };
    let sub_rules = if rule.sub_rules.is_empty() {
        String::new()
    } else {
        let rows: String = rule
            .sub_rules
            .iter()
            .map(|sub| {
                format!(
                    r#"<div class="sub-rule"><span class="sub-rule-number">{}</span><span>{}</span></div>"#,
                    escape_html(&sub.id),
                    escape_html(&sub.text)
                )
            })
            .collect();
        format!(r#"<div class="sub-rules">{rows}</div>"#)
    };
    format!(
        r#"<div class="rule-item{important}"><div class="rule-header"><span class="rule-number">{}</span><span class="rule-title">{}</span></div><p class="rule-description">{}</p>{sub_rules}</div>"#,
        escape_html(&rule.id),
        escape_html(&rule.title),
        escape_html(&rule.description)
    )
}

pub fn category_html(index: usize, category: &RuleCategory) -> String {
    let rules = if category.rules.is_empty() {
        format!(r#"<p class="empty-category">{EMPTY_CATEGORY}</p>"#)
    } else {
        category.rules.iter().map(rule_html).collect()
    };
    format!(
        r#"<div class="rule-category-section" id="{}"><div class="category-header"><div class="category-icon">{}</div><h2><span>{}.</span> {}</h2></div>{rules}</div>"#,
        escape_html(&category.id),
        escape_html(&category.icon),
        index + 1,
        escape_html(&category.name)
    )
}

pub fn content_html(categories: &[RuleCategory]) -> String {
    if categories.is_empty() {
        return EMPTY_RULES.to_html();
    }
    categories
        .iter()
        .enumerate()
        .map(|(i, c)| category_html(i, c))
        .collect()
}

/// Admin list card for a category with its rule count and actions.
pub fn admin_category_card(category: &RuleCategory) -> String {
    let id = escape_html(&category.id);
    let rules: String = category
        .rules
        .iter()
        .map(|r| {
            format!(
                r#"<li data-rule-id="{0}"><span class="rule-number">{0}</span> {1}<button class="btn btn-icon" data-action="edit-rule" data-category="{id}" data-id="{0}" title="Editează">✎</button><button class="btn btn-icon danger" data-action="delete-rule" data-category="{id}" data-id="{0}" title="Șterge">✕</button></li>"#,
                escape_html(&r.id),
                escape_html(&r.title)
            )
        })
        .collect();
    format!(
        r#"<div class="admin-category-card" data-id="{id}"><div class="category-info"><h3>{} {}</h3><span class="rule-count">{} reguli</span><ul class="admin-rules">{rules}</ul></div><div class="category-actions"><button class="btn btn-small" data-action="add-rule" data-id="{id}">+ Regulă</button><button class="btn btn-icon" data-action="edit" data-id="{id}" title="Editează">✎</button><button class="btn btn-icon danger" data-action="delete" data-id="{id}" title="Șterge">✕</button></div></div>"#,
        escape_html(&category.icon),
        escape_html(&category.name),
        category.rules.len()
    )
}

pub const fn admin_categories() -> ListRenderer<RuleCategory> {
    ListRenderer::new(EMPTY_RULES, admin_category_card)
}

/// Everything the rules page fills in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesPage {
    pub last_updated: String,
    pub total_rules: usize,
    pub toc_html: String,
    pub content_html: String,
}

impl RulesPage {
    pub fn build(last_updated: &str, categories: &[RuleCategory]) -> Self {
        Self {
            last_updated: last_updated.to_string(),
            total_rules: categories.iter().map(|c| c.rules.len()).sum(),
            toc_html: toc_html(categories),
            content_html: content_html(categories),
        }
    }

    /// Writes the table of contents and the content into their containers.
    pub fn render(&self, toc: &mut dyn ViewSink, content: &mut dyn ViewSink) {
        toc.replace_contents(&self.toc_html);
        content.replace_contents(&self.content_html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubRule;

    fn categories() -> Vec<RuleCategory> {
        vec![
            RuleCategory {
                id: "general".into(),
                icon: "📜".into(),
                name: "Reguli Generale".into(),
                rules: vec![
                    RuleEntry {
                        id: "1.1".into(),
                        title: "Respect".into(),
                        description: "Fără insulte".into(),
                        important: true,
                        sub_rules: vec![SubRule { id: "1.1.a".into(), text: "Nici în OOC".into() }],
                    },
                    RuleEntry {
                        id: "1.2".into(),
                        title: "Limbaj".into(),
                        description: "Română".into(),
                        important: false,
                        sub_rules: vec![],
                    },
                ],
            },
            RuleCategory {
                id: "factiuni".into(),
                icon: "🏴".into(),
                name: "Facțiuni".into(),
                rules: vec![],
            },
        ]
    }

    #[test]
    fn toc_numbers_from_one() {
        let entries = toc(&categories());
        assert_eq!(entries[0].number, 1);
        assert_eq!(entries[1].number, 2);
        assert_eq!(entries[1].label, "🏴 Facțiuni");
        assert!(toc_html(&categories()).contains(r##"href="#factiuni""##));
    }

    #[test]
    fn page_counts_rules_and_marks_empty_categories() {
        let page = RulesPage::build("5 Mai 2025", &categories());
        assert_eq!(page.total_rules, 2);
        assert!(page.content_html.contains("rule-item important"));
        assert!(page.content_html.contains(r#"<span class="sub-rule-number">1.1.a</span>"#));
        assert!(page.content_html.contains(EMPTY_CATEGORY));
        assert!(page.content_html.contains("<h2><span>2.</span> Facțiuni</h2>"));
    }

    #[test]
    fn no_categories_renders_empty_state() {
        let page = RulesPage::build("", &[]);
        assert_eq!(page.total_rules, 0);
        assert!(page.toc_html.is_empty());
        assert!(page.content_html.contains("Nu s-au găsit reguli"));
    }
}
