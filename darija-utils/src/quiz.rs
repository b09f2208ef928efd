//! The lesson 1 quiz: one multiple choice, one essay and one true/false question.

use serde::{Deserialize, Serialize};

pub const QUIZ_ID: &str = "quiz1";
pub const TOTAL_QUESTIONS: u32 = 3;

pub const MULTIPLE_CHOICE_ANSWER: char = 'b';
pub const TRUE_FALSE_ANSWER: bool = true;
pub const ESSAY_MIN_WORDS: usize = 50;
pub const ESSAY_KEYWORDS: [&str; 7] = ["مسار", "طريق", "أمثل", "سرعة", "تكلفة", "خوارزمية", "بحث"];

/// The learner's answers so far. Replaces page-global quiz state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub multiple_choice: Option<char>,
    pub essay: String,
    pub true_false: Option<bool>,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

impl QuizAnswers {
    pub fn select_option(&mut self, option: char) {
        self.multiple_choice = Some(option.to_ascii_lowercase());
    }

    pub fn select_true_false(&mut self, value: bool) {
        self.true_false = Some(value);
    }

    pub fn set_essay(&mut self, text: &str) {
        self.essay = text.trim().to_string();
    }

    pub fn essay_complete(&self) -> bool {
        word_count(&self.essay) >= ESSAY_MIN_WORDS
    }

    /// Number of questions answered, for a "Progress: n/3" display.
    pub fn answered_count(&self) -> u32 {
        [
            self.multiple_choice.is_some(),
            self.essay_complete(),
            self.true_false.is_some(),
        ]
        .into_iter()
        .filter(|answered| *answered)
        .count() as u32
    }

    pub fn can_submit(&self) -> bool {
        self.answered_count() == TOTAL_QUESTIONS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    MultipleChoice,
    Essay,
    TrueFalse,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuestionKind::MultipleChoice => "Multiple Choice",
            QuestionKind::Essay => "Essay",
            QuestionKind::TrueFalse => "True/False",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: u32,
    pub kind: QuestionKind,
    pub correct: bool,
    pub user_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub feedback: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub score: u32,
    pub total: u32,
    pub details: Vec<QuestionResult>,
}

impl QuizResults {
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }

    pub fn wrong_questions(&self) -> impl Iterator<Item = &QuestionResult> {
        self.details.iter().filter(|d| !d.correct)
    }
}

pub fn evaluate(answers: &QuizAnswers) -> QuizResults {
    let q1_correct = answers.multiple_choice == Some(MULTIPLE_CHOICE_ANSWER);
    let q1 = QuestionResult {
        question: 1,
        kind: QuestionKind::MultipleChoice,
        correct: q1_correct,
        user_answer: answers.multiple_choice.map(String::from),
        correct_answer: Some(MULTIPLE_CHOICE_ANSWER.to_string()),
        feedback: if q1_correct {
            "ممتاز! البحث المدروس يستخدم معلومات إضافية لتوجيه البحث."
        } else {
            "الإجابة الصحيحة هي (ب). البحث المدروس يستخدم معلومات إضافية مثل الدوال الاستدلالية."
        }
        .to_string(),
    };

    let has_keyword = ESSAY_KEYWORDS.iter().any(|k| answers.essay.contains(k));
    let q2_correct = answers.essay_complete() && has_keyword;
    let q2 = QuestionResult {
        question: 2,
        kind: QuestionKind::Essay,
        correct: q2_correct,
        user_answer: Some(answers.essay.clone()),
        correct_answer: None,
        feedback: if q2_correct {
            "إجابة جيدة! تظهر فهماً عميقاً لتطبيق خوارزميات البحث في التطبيقات الحقيقية."
        } else {
            "إجابتك تحتاج لمزيد من التفصيل. فكر في كيفية العثور على أقصر مسار أو أقل تكلفة."
        }
        .to_string(),
    };

    let q3_correct = answers.true_false == Some(TRUE_FALSE_ANSWER);
    let q3 = QuestionResult {
        question: 3,
        kind: QuestionKind::TrueFalse,
        correct: q3_correct,
        user_answer: answers.true_false.map(|v| v.to_string()),
        correct_answer: Some(TRUE_FALSE_ANSWER.to_string()),
        feedback: if q3_correct {
            "صحيح! خوارزمية A* تضمن الحل الأمثل عندما تكون الدالة الاستدلالية مقبولة."
        } else {
            "الإجابة الصحيحة هي \"صحيح\". A* تضمن الحل الأمثل مع دالة استدلالية مقبولة."
        }
        .to_string(),
    };

    let details = vec![q1, q2, q3];
    QuizResults {
        score: details.iter().filter(|d| d.correct).count() as u32,
        total: TOTAL_QUESTIONS,
        details,
    }
}

/// Longer review notes shown for a question the learner got wrong.
pub fn detailed_explanation(question: u32) -> &'static [&'static str] {
    match question {
        1 => &[
            "تذكر: الفرق الأساسي بين البحث المدروس وغير المدروس هو استخدام المعلومات الإضافية (heuristics).",
            "البحث غير المدروس: مثل DFS و BFS - لا يعرف اتجاه الهدف",
            "البحث المدروس: مثل A* - يستخدم دالة استدلالية لتوجيه البحث",
        ],
        2 => &[
            "في تطبيقات النقل مثل كريم:",
            "النظام يبحث عن أقصر مسار أو أقل تكلفة",
            "يستخدم خوارزميات مثل Dijkstra أو A*",
            "يأخذ في الاعتبار الزحمة والمسافة والوقت",
            "الهدف هو تحسين تجربة المستخدم والوصول السريع",
        ],
        3 => &[
            "خوارزمية A* والدالة الاستدلالية:",
            "A* تضمن الحل الأمثل إذا كانت الدالة الاستدلالية \"مقبولة\"",
            "الدالة المقبولة: لا تبالغ في تقدير التكلفة للوصول للهدف",
            "هذا ما يجعل A* مفيدة في التطبيقات الحقيقية",
        ],
        _ => &[],
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportItem {
    pub question: u32,
    pub feedback: String,
    pub explanation: &'static [&'static str],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextStep {
    /// Every answer was right; the next lesson is unlocked.
    ProceedToNextLesson,
    /// Some answers were wrong; review material for each of them.
    Support {
        intro: &'static str,
        items: Vec<SupportItem>,
        tip: &'static str,
    },
}

pub fn next_step(results: &QuizResults) -> NextStep {
    if results.is_perfect() {
        return NextStep::ProceedToNextLesson;
    }
    NextStep::Support {
        intro: "It's okay, learning is a gradual process! Let me help you understand the concepts you need to review.",
        items: results
            .wrong_questions()
            .map(|q| SupportItem {
                question: q.question,
                feedback: q.feedback.clone(),
                explanation: detailed_explanation(q.question),
            })
            .collect(),
        tip: "Review the lesson again and focus on the points you missed. Repetition is the key to understanding!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essay(words: usize, keyword: bool) -> String {
        let mut text = vec!["كلمة"; words];
        if keyword {
            text[0] = "مسار";
        }
        text.join(" ")
    }

    fn perfect_answers() -> QuizAnswers {
        let mut answers = QuizAnswers::default();
        answers.select_option('B');
        answers.set_essay(&essay(50, true));
        answers.select_true_false(true);
        answers
    }

    #[test]
    fn test_progress_counts_answers() {
        let mut answers = QuizAnswers::default();
        assert_eq!(answers.answered_count(), 0);
        answers.select_option('a');
        answers.set_essay(&essay(49, true));
        assert_eq!(answers.answered_count(), 1);
        assert!(!answers.can_submit());
        answers.set_essay(&essay(50, false));
        answers.select_true_false(false);
        assert_eq!(answers.answered_count(), 3);
        assert!(answers.can_submit());
    }

    #[test]
    fn test_perfect_quiz() {
        let results = evaluate(&perfect_answers());
        assert_eq!(results.score, 3);
        assert!(results.is_perfect());
        assert_eq!(next_step(&results), NextStep::ProceedToNextLesson);
    }

    #[test]
    fn test_essay_needs_keyword_and_length() {
        let mut answers = perfect_answers();
        answers.set_essay(&essay(80, false));
        assert!(!evaluate(&answers).details[1].correct);

        answers.set_essay(&essay(30, true));
        assert!(!evaluate(&answers).details[1].correct);
    }

    #[test]
    fn test_wrong_answers_get_support() {
        let mut answers = perfect_answers();
        answers.select_option('c');
        answers.select_true_false(false);
        let results = evaluate(&answers);
        assert_eq!(results.score, 1);
        assert_eq!(results.details[0].user_answer.as_deref(), Some("c"));

        match next_step(&results) {
            NextStep::Support { items, .. } => {
                let questions = items.iter().map(|i| i.question).collect::<Vec<_>>();
                assert_eq!(questions, vec![1, 3]);
                assert!(!items[0].explanation.is_empty());
            }
            NextStep::ProceedToNextLesson => panic!("expected support content"),
        }
    }

    #[test]
    fn test_unanswered_quiz_scores_zero() {
        let results = evaluate(&QuizAnswers::default());
        assert_eq!(results.score, 0);
        assert_eq!(results.total, 3);
        assert_eq!(results.details[2].user_answer, None);
    }
}
