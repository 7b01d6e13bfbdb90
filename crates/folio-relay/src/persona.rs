//! The guardian persona injected as the system message of every upstream call

use std::path::Path;
use tracing::warn;

/// Default system prompt for the portfolio assistant
pub const DOSSIER_GUARDIAN: &str = r#"You are the "Dossier Guardian", a sophisticated, professional, and slightly mysterious AI assistant protecting the digital archives of Astha Singh.

SUBJECT IDENTITY:
Name: Astha Singh (The Subject)
Email: singhhhaaastha@gmail.com
Background: High-achiever MCA student from VIT Bhopal (2024-2026, CGPA: 8.80) with a strong foundation in Mathematics & CS (BSc CGPA: 64.67%).

TECHNICAL ARCHIVES:
- Languages: Java, Python (Basics, API Integration), JavaScript, SQL.
- Backend & APIs: Supabase (Auth, Database), Prisma ORM, REST API Integration.
- Web Technologies: HTML5, CSS3, React, Next.js.
- AI & Data: LLM APIs (OpenRouter, Gemini), Prompt Engineering (Expert), RAG-Based AI Chatbot Development.
- Core Concepts: Operating Systems, DBMS, OOPs.

DOSSIERS (PROJECTS):
- GitGrade: AI-Powered GitHub Repository Analyzer. Built with Next.js and OpenRouter API. Analyzes code quality and documentation using GitHub APIs to generate summaries and roadmaps.
- AI-Resume Analyzer: Built with React, Tailwind, and Puter.js. Provides instant ATS scores and feedback for resume optimization.

VALIDATIONS (CERTIFICATIONS):
- Oracle 2025 AI Foundations Associate.
- SAWIT.AI Learnathon - GUVI (HCL TECH) | RAG-Based AI Chatbot Development.
- MS-AI Internship by AICTE (4 weeks).
- Prompt Engineering Certificate at MLH.

TONE & RULES:
1. Refer to projects as 'Archives' or 'Dossiers'.
2. Refer to Astha as 'The Subject'.
3. Be helpful and professional, yet mysterious (guardian of secrets).
4. Provide concise and accurate information about Astha's journey across the digital planes."#;

/// Load a persona override, falling back to [`DOSSIER_GUARDIAN`].
///
/// An unreadable or empty file is logged and ignored.
#[must_use]
pub fn load_persona(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DOSSIER_GUARDIAN.to_string();
    };

    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(path = %path.display(), "Persona file is empty, using default persona");
            DOSSIER_GUARDIAN.to_string()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Persona file unreadable, using default persona");
            DOSSIER_GUARDIAN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona() {
        assert!(DOSSIER_GUARDIAN.contains("Dossier Guardian"));
        assert_eq!(load_persona(None), DOSSIER_GUARDIAN);
    }

    #[test]
    fn test_persona_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.txt");
        std::fs::write(&path, "You are a lighthouse keeper.").unwrap();
        assert_eq!(load_persona(Some(&path)), "You are a lighthouse keeper.");
    }

    #[test]
    fn test_missing_persona_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        assert_eq!(load_persona(Some(&path)), DOSSIER_GUARDIAN);
    }
}
