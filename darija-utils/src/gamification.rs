//! Points, badges and levels.
//!
//! All state lives in [`UserData`]; callers load it, pass it through these
//! functions and persist it again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub total_points: u32,
    pub current_level: u32,
    pub badges: Vec<String>,
    pub quizzes_completed: u32,
    pub lessons_completed: u32,
    pub streak: u32,
    pub last_activity: Option<DateTime<Utc>>,
    pub achievements: Vec<String>,
    /// Quizzes that already paid out points.
    pub completed_quizzes: Vec<String>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            total_points: 0,
            current_level: 1,
            badges: Vec::new(),
            quizzes_completed: 0,
            lessons_completed: 0,
            streak: 0,
            last_activity: None,
            achievements: Vec::new(),
            completed_quizzes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCondition {
    QuizCompleted,
    PerfectQuiz,
    FastLearning,
    Quizzes5,
    Quizzes10,
    Points100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub name_en: &'static str,
    pub description: &'static str,
    pub description_en: &'static str,
    pub icon: &'static str,
    pub points_required: u32,
    pub condition: BadgeCondition,
}

pub const BADGES: [Badge; 6] = [
    Badge {
        id: "first_quiz",
        name: "أول اختبار",
        name_en: "First Quiz",
        description: "أكمل أول اختبار بنجاح",
        description_en: "Complete your first quiz successfully",
        icon: "🎯",
        points_required: 0,
        condition: BadgeCondition::QuizCompleted,
    },
    Badge {
        id: "perfect_score",
        name: "النتيجة المثالية",
        name_en: "Perfect Score",
        description: "احصل على نتيجة مثالية في الاختبار",
        description_en: "Get a perfect score on a quiz",
        icon: "⭐",
        points_required: 0,
        condition: BadgeCondition::PerfectQuiz,
    },
    Badge {
        id: "quick_learner",
        name: "المتعلم السريع",
        name_en: "Quick Learner",
        description: "أكمل 3 دروس في أقل من ساعة",
        description_en: "Complete 3 lessons in less than an hour",
        icon: "⚡",
        points_required: 0,
        condition: BadgeCondition::FastLearning,
    },
    Badge {
        id: "dedicated_student",
        name: "الطالب المتفاني",
        name_en: "Dedicated Student",
        description: "أكمل 5 اختبارات",
        description_en: "Complete 5 quizzes",
        icon: "📚",
        points_required: 0,
        condition: BadgeCondition::Quizzes5,
    },
    Badge {
        id: "ai_expert",
        name: "خبير الذكاء الاصطناعي",
        name_en: "AI Expert",
        description: "احصل على 100 نقطة",
        description_en: "Earn 100 points",
        icon: "🤖",
        points_required: 100,
        condition: BadgeCondition::Points100,
    },
    Badge {
        id: "master_learner",
        name: "سيد التعلم",
        name_en: "Master Learner",
        description: "أكمل 10 اختبارات",
        description_en: "Complete 10 quizzes",
        icon: "👑",
        points_required: 0,
        condition: BadgeCondition::Quizzes10,
    },
];

pub fn badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u32,
    pub name: &'static str,
    pub name_en: &'static str,
    pub points_required: u32,
    pub color: &'static str,
    pub icon: &'static str,
}

pub const LEVELS: [Level; 5] = [
    Level {
        level: 1,
        name: "مبتدئ",
        name_en: "Beginner",
        points_required: 0,
        color: "#4CAF50",
        icon: "🌱",
    },
    Level {
        level: 2,
        name: "متقدم",
        name_en: "Advanced",
        points_required: 50,
        color: "#2196F3",
        icon: "📈",
    },
    Level {
        level: 3,
        name: "خبير",
        name_en: "Expert",
        points_required: 150,
        color: "#FF9800",
        icon: "🎓",
    },
    Level {
        level: 4,
        name: "أستاذ",
        name_en: "Master",
        points_required: 300,
        color: "#9C27B0",
        icon: "👨‍🏫",
    },
    Level {
        level: 5,
        name: "أسطورة",
        name_en: "Legend",
        points_required: 500,
        color: "#F44336",
        icon: "🏆",
    },
];

pub fn current_level(total_points: u32) -> u32 {
    LEVELS
        .iter()
        .rev()
        .find(|l| total_points >= l.points_required)
        .map_or(1, |l| l.level)
}

/// Unknown levels fall back to the first one.
pub fn level_info(level: u32) -> &'static Level {
    LEVELS.iter().find(|l| l.level == level).unwrap_or(&LEVELS[0])
}

pub fn next_level(level: u32) -> Option<&'static Level> {
    LEVELS.iter().find(|l| l.level == level + 1)
}

/// `None` once the last level is reached.
pub fn points_to_next_level(total_points: u32) -> Option<u32> {
    next_level(current_level(total_points)).map(|l| l.points_required.saturating_sub(total_points))
}

/// What triggered a points award; decides whether the perfect-score badge can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsSource {
    Quiz,
    PerfectQuiz,
}

const PERFECT_BONUS: u32 = 25;
const QUICK_BONUS: u32 = 15;
const QUICK_LIMIT_SECS: u64 = 300;
const FIRST_QUIZ_BONUS: u32 = 20;
const MIN_QUIZ_POINTS: u32 = 10;

pub fn calculate_quiz_points(user: &UserData, score: u32, total: u32, time_spent_secs: u64) -> u32 {
    let mut points = if total > 0 { score * 50 / total } else { 0 };
    if score == total {
        points += PERFECT_BONUS;
    }
    if time_spent_secs < QUICK_LIMIT_SECS {
        points += QUICK_BONUS;
    }
    if user.quizzes_completed == 0 {
        points += FIRST_QUIZ_BONUS;
    }
    points.max(MIN_QUIZ_POINTS)
}

/// Awards every badge whose condition now holds and that the user does not have yet.
pub fn check_new_badges(user: &mut UserData, source: PointsSource) -> Vec<&'static Badge> {
    let mut new_badges = Vec::new();
    for badge in &BADGES {
        if user.badges.iter().any(|b| b == badge.id) {
            continue;
        }
        let award = match badge.condition {
            BadgeCondition::QuizCompleted => user.quizzes_completed >= 1,
            BadgeCondition::PerfectQuiz => source == PointsSource::PerfectQuiz,
            BadgeCondition::Quizzes5 => user.quizzes_completed >= 5,
            BadgeCondition::Quizzes10 => user.quizzes_completed >= 10,
            BadgeCondition::Points100 => user.total_points >= 100,
            // no activity timing is tracked yet
            BadgeCondition::FastLearning => false,
        };
        if award {
            user.badges.push(badge.id.to_string());
            new_badges.push(badge);
        }
    }
    new_badges
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsAward {
    pub points_awarded: u32,
    pub total_points: u32,
    pub leveled_up: bool,
    pub old_level: u32,
    pub new_level: u32,
    pub new_badges: Vec<&'static Badge>,
}

pub fn award_points(
    user: &mut UserData,
    points: u32,
    source: PointsSource,
    now: DateTime<Utc>,
) -> PointsAward {
    let old_level = current_level(user.total_points);
    user.total_points += points;
    user.last_activity = Some(now);

    let new_level = current_level(user.total_points);
    user.current_level = new_level;
    let new_badges = check_new_badges(user, source);

    PointsAward {
        points_awarded: points,
        total_points: user.total_points,
        leveled_up: new_level > old_level,
        old_level,
        new_level,
        new_badges,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizCompletion {
    #[serde(flatten)]
    pub award: PointsAward,
    /// The quiz had already paid out, so nothing was awarded this time.
    pub already_completed: bool,
}

/// Records a finished quiz. Points are only paid the first time `quiz_id` completes.
///
/// The quiz counter is incremented before points are computed.
pub fn complete_quiz(
    user: &mut UserData,
    score: u32,
    total: u32,
    time_spent_secs: u64,
    quiz_id: &str,
    now: DateTime<Utc>,
) -> QuizCompletion {
    let already_completed = is_quiz_completed(user, quiz_id);
    user.quizzes_completed += 1;

    if already_completed {
        log::info!("Quiz {quiz_id} already completed - no points awarded");
        let level = current_level(user.total_points);
        return QuizCompletion {
            award: PointsAward {
                points_awarded: 0,
                total_points: user.total_points,
                leveled_up: false,
                old_level: level,
                new_level: level,
                new_badges: Vec::new(),
            },
            already_completed: true,
        };
    }

    // counted after the increment, so the first-quiz bonus never applies here
    let points = calculate_quiz_points(user, score, total, time_spent_secs);
    let source = if score == total {
        PointsSource::PerfectQuiz
    } else {
        PointsSource::Quiz
    };
    let award = award_points(user, points, source, now);
    user.completed_quizzes.push(quiz_id.to_string());

    QuizCompletion {
        award,
        already_completed: false,
    }
}

/// Lessons are counted but earn no points.
pub fn complete_lesson(user: &mut UserData) -> u32 {
    user.lessons_completed += 1;
    user.total_points
}

pub fn is_quiz_completed(user: &UserData, quiz_id: &str) -> bool {
    user.completed_quizzes.iter().any(|q| q == quiz_id)
}

pub fn reset_quiz_completion(user: &mut UserData, quiz_id: &str) {
    user.completed_quizzes.retain(|q| q != quiz_id);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_points: u32,
    pub current_level: u32,
    pub level_info: &'static Level,
    pub badges: Vec<&'static Badge>,
    pub quizzes_completed: u32,
    pub lessons_completed: u32,
    pub streak: u32,
}

pub fn user_stats(user: &UserData) -> UserStats {
    let level = current_level(user.total_points);
    UserStats {
        total_points: user.total_points,
        current_level: level,
        level_info: level_info(level),
        badges: user.badges.iter().filter_map(|id| badge(id)).collect(),
        quizzes_completed: user.quizzes_completed,
        lessons_completed: user.lessons_completed,
        streak: user.streak,
    }
}
