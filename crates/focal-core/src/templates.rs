//! Built-in note templates.
//!
//! Accounts can also mark their own notes as templates; those live in
//! the database. The ones here ship with the product and are addressed
//! by a stable string id instead of a UUID.

use serde::Serialize;

/// A note template shipped with the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuiltinTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub emoji: &'static str,
    /// Markdown body the new note is seeded with.
    #[serde(rename = "content")]
    pub body: &'static str,
    /// Doubles as the note_type of notes created from the template.
    pub category: &'static str,
}

pub const BUILTIN_TEMPLATES: [BuiltinTemplate; 3] = [
    BuiltinTemplate {
        id: "meeting-notes",
        title: "Meeting Notes",
        emoji: "👥",
        category: "meeting",
        body: "# Meeting Notes

## 📅 Meeting Info
- **Date**:
- **Time**:
- **Attendees**:
- **Location**:

## 📋 Agenda
1.
2.
3.

## 💡 Discussion


## ✅ Decisions


## 📝 Action Items
- [ ]
- [ ]
- [ ]

## 📌 Next Meeting
- **Date**:
- **Agenda**:
",
    },
    BuiltinTemplate {
        id: "daily-planning",
        title: "Daily Plan",
        emoji: "📋",
        category: "planning",
        body: "# Today's Plan

## 🎯 Top Goals
1.
2.
3.

## ⏰ Schedule
- **09:00 - 10:00**:
- **10:00 - 12:00**:
- **13:00 - 15:00**:
- **15:00 - 17:00**:
- **17:00 - 18:00**:

## 📞 Meetings


## 🧠 Learning


## 💭 Ideas


## 🌟 Wins
-
-
-
",
    },
    BuiltinTemplate {
        id: "project-brief",
        title: "Project Brief",
        emoji: "🚀",
        category: "project",
        body: "# Project Brief

## 📖 Overview
**Project**:
**Timeline**:
**Owner**:

## 🎯 Goals
### Primary Goals

### Success Metrics

## 📊 Current State
### Problem

### Opportunity

## 💡 Solution
### Approach

### Key Features

## 📅 Milestones
- **Phase 1**:
- **Phase 2**:
- **Phase 3**:

## 💰 Budget


## 🚨 Risks


## 📈 Expected Impact
",
    },
];

/// Look up a built-in template by its stable id.
pub fn builtin_template(id: &str) -> Option<&'static BuiltinTemplate> {
    BUILTIN_TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let template = builtin_template("meeting-notes").unwrap();
        assert_eq!(template.title, "Meeting Notes");
        assert_eq!(template.category, "meeting");
    }

    #[test]
    fn test_unknown_id() {
        assert!(builtin_template("retrospective").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = BUILTIN_TEMPLATES.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN_TEMPLATES.len());
    }

    #[test]
    fn test_bodies_are_markdown_documents() {
        for template in &BUILTIN_TEMPLATES {
            assert!(template.body.starts_with("# "), "{}", template.id);
            assert!(!template.emoji.is_empty());
        }
    }

    #[test]
    fn test_serializes_body_as_content() {
        let value = serde_json::to_value(builtin_template("daily-planning").unwrap()).unwrap();
        assert!(value["content"].as_str().unwrap().contains("Top Goals"));
        assert!(value.get("body").is_none());
    }
}
