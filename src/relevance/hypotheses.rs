// Hypothesis bank for UAE education relevance.
//
// Order affects only how soon texts drop out of evaluation, never which
// texts end up relevant: broad assertions come first so most relevant
// texts are confirmed early.

use std::path::Path;

use super::error::ScoreError;

/// Built-in assertions tested against every text.
pub const UAE_EDUCATION_HYPOTHESES: &[&str] = &[
    // Core education concepts
    "This text is about education in the UAE.",
    "This text is about schools or universities in the United Arab Emirates.",
    "This text is about studying, learning, or teaching in the UAE.",
    "This text is about the education system in the UAE.",
    "This text is about students or academic institutions in the UAE.",

    // Fees and admissions
    "This text is about school fees or university fees in the UAE.",
    "This text is about enrolling or applying to schools or universities in the UAE.",
    "This text is about admission requirements in the UAE.",
    "This text is about tuition costs in the UAE.",

    // Expat/International
    "This text is about expatriate or international students in the UAE.",
    "This text is about foreign students studying in UAE schools.",
    "This text is about visa requirements for students in the UAE.",
    "This text is about international schools in the UAE.",
    "This text is about children of foreign workers in UAE schools.",
    "This text is about student visa procedures for the UAE.",

    // Higher education
    "This text is about universities or higher education in the UAE.",
    "This text is about scholarships or financial aid in the UAE.",
    "This text discusses university admissions in the UAE.",
    "This text is about postgraduate studies in the UAE.",

    // Career Development
    "This text is about scholarships in the UAE.",
    "This text discusses student scholarships or work placements in the UAE.",
    "This text is about career opportunities for students in the UAE.",
    "This text mentions graduate employment or job opportunities in the UAE.",
    "This text is about professional training or work experience in the UAE.",

    // Student life and services
    "This text discusses student life or school activities in the UAE.",
    "This text is about educational services or support in the UAE.",
    "This text mentions extracurricular activities in UAE schools.",
    "This text is about school transportation in the UAE.",

    // Educational authorities and policies
    "This text mentions KHDA, ADEK, or UAE education authorities.",
    "This text refers to the UAE's Ministry of Education or educational policies.",
    "This text discusses school inspections or ratings in the UAE.",

    // Dubai
    "This text is about schools or universities in Dubai.",
    "This text is about education in Dubai.",
    "This text mentions student life in Dubai.",
    "This text is about school fees in Dubai.",
    "This text is about university fees in Dubai.",
    "This text discusses tuition costs in Dubai.",
    "This text is about scholarships in Dubai.",

    // Abu Dhabi
    "This text is about schools or universities in Abu Dhabi.",
    "This text is about education in Abu Dhabi.",
    "This text mentions student life in Abu Dhabi.",
    "This text is about school fees in Abu Dhabi.",
    "This text is about university fees in Abu Dhabi.",
    "This text discusses tuition costs in Abu Dhabi.",
    "This text is about scholarships in Abu Dhabi.",

    // Sharjah
    "This text is about schools or universities in Sharjah.",
    "This text is about education in Sharjah.",
    "This text mentions student life in Sharjah.",
    "This text is about school fees in Sharjah.",
    "This text is about university fees in Sharjah.",
    "This text discusses tuition costs in Sharjah.",
    "This text is about scholarships in Sharjah.",

    // Other Emirates
    "This text is about schools or universities in Ajman.",
    "This text is about education in Ajman.",
    "This text is about school fees in Ajman.",
    "This text is about scholarships in Ajman.",
    "This text is about schools or universities in Ras Al Khaimah.",
    "This text is about education in Ras Al Khaimah.",
    "This text is about school fees in Ras Al Khaimah.",
    "This text is about scholarships in Ras Al Khaimah.",
    "This text is about schools or universities in Fujairah.",
    "This text is about education in Fujairah.",
    "This text is about school fees in Fujairah.",
    "This text is about scholarships in Fujairah.",
    "This text is about schools or universities in Umm Al Quwain.",
    "This text is about school fees in Umm Al Quwain.",
    "This text is about scholarships in Umm Al Quwain.",
    "This text is about schools or universities in Al Ain.",
    "This text is about school fees in Al Ain.",
    "This text is about scholarships in Al Ain.",

    // Specific education types
    "This text is about Arabic language education in UAE schools.",
    "This text is about Islamic studies in UAE schools.",
    "This text discusses vocational training institutes in the UAE.",
    "This text is about technical or skills-based education in the UAE.",

    // Broad catch-alls
    "This text contains information relevant to someone seeking education in the UAE.",
    "This text would be useful for parents or students considering UAE education.",
];

/// The built-in bank as owned strings.
pub fn default_hypotheses() -> Vec<String> {
    UAE_EDUCATION_HYPOTHESES
        .iter()
        .map(|h| h.to_string())
        .collect()
}

/// Parse a hypothesis bank: one assertion per line. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse_hypotheses(raw: &str) -> Result<Vec<String>, ScoreError> {
    let bank: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    if bank.is_empty() {
        return Err(ScoreError::invalid("hypothesis file contains no hypotheses"));
    }
    Ok(bank)
}

/// Load a hypothesis bank from a file.
pub fn load_hypotheses(path: &Path) -> Result<Vec<String>, ScoreError> {
    let raw = std::fs::read_to_string(path)?;
    parse_hypotheses(&raw)
}
