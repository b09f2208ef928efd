use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use darija_utils::gamification::{self, UserData};
use darija_utils::playback::{PlaybackState, format_time};
use darija_utils::quiz::{self, NextStep, QUIZ_ID, QuizAnswers};
use darija_utils::{patterns, quality, text_cleanup, validation};
use indicatif::{ProgressBar, ProgressStyle};
use lesson_generator::audio::RATE_LIMIT_DELAY;
use lesson_generator::config::Config;
use lesson_generator::elevenlabs::ElevenLabsClient;
use lesson_generator::openai::OpenAiClient;
use lesson_generator::orchestrator::{MAX_ATTEMPTS, Orchestrator};
use lesson_generator::pipeline;
use lesson_generator::storage::{self, FileStore};

/// ElevenLabs' default MP3 output is 128 kbit/s.
const MP3_BYTES_PER_SEC: usize = 128_000 / 8;

#[derive(Parser, Debug)]
#[command(version, about = "Generate and study Moroccan Darija lessons", long_about = None)]
struct Args {
    /// Store file (defaults to $LESSON_STORE, then .lesson-store.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate lesson 1 with narrated audio and save it
    Generate {
        #[arg(long, default_value_t = MAX_ATTEMPTS)]
        max_attempts: u32,
        /// Save the lesson text only
        #[arg(long)]
        skip_audio: bool,
        /// Regenerate even if a lesson is already saved
        #[arg(long)]
        force: bool,
    },
    /// Print the saved lesson and walk through its audio
    Show {
        /// Write the audio chunks as MP3 files into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Delete the saved lesson and its audio
    Clear,
    /// Score a text for Darija quality
    Score { text: String },
    /// Rewrite a text towards colloquial Darija
    Rewrite { text: String },
    /// Submit answers to the lesson 1 quiz
    Quiz {
        /// Multiple choice answer (a-d)
        #[arg(long)]
        q1: char,
        /// True/false answer
        #[arg(long, action = clap::ArgAction::Set)]
        q3: bool,
        /// File containing the essay answer
        #[arg(long)]
        essay_file: PathBuf,
        /// Seconds spent on the quiz
        #[arg(long, default_value_t = 600)]
        time_spent: u64,
        #[arg(long, default_value = QUIZ_ID)]
        quiz_id: String,
    },
    /// Mark lesson 1 as completed
    CompleteLesson,
    /// Show points, level and badges
    Stats,
    /// Allow a quiz to award points again
    ResetQuiz { quiz_id: String },
    /// Delete all points, badges and levels
    ResetProgress,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = Config::from_env();
    let store_path = args.store.unwrap_or_else(|| config.store_path.clone());

    match args.command {
        Command::Generate {
            max_attempts,
            skip_audio,
            force,
        } => {
            let mut store = open_store(&store_path)?;
            generate(&config, &mut store, max_attempts, skip_audio, force).await
        }
        Command::Show { export } => show(&open_store(&store_path)?, export),
        Command::Clear => {
            storage::clear_lesson_data(&mut open_store(&store_path)?)?;
            println!("Lesson data cleared");
            Ok(())
        }
        Command::Score { text } => {
            score(&text);
            Ok(())
        }
        Command::Rewrite { text } => {
            println!("{}", text_cleanup::rewrite(&text));
            Ok(())
        }
        Command::Quiz {
            q1,
            q3,
            essay_file,
            time_spent,
            quiz_id,
        } => {
            let essay = std::fs::read_to_string(&essay_file)
                .with_context(|| format!("Failed to read essay from {}", essay_file.display()))?;
            let mut answers = QuizAnswers::default();
            answers.select_option(q1);
            answers.set_essay(&essay);
            answers.select_true_false(q3);
            submit_quiz(&mut open_store(&store_path)?, &answers, time_spent, &quiz_id)
        }
        Command::CompleteLesson => {
            let mut store = open_store(&store_path)?;
            let mut user = storage::load_user_data(&store)?;
            let total = gamification::complete_lesson(&mut user);
            storage::save_user_data(&mut store, &user)?;
            storage::mark_lesson_completed(&mut store)?;
            println!("Lesson completed! Total points: {total}");
            Ok(())
        }
        Command::Stats => stats(&open_store(&store_path)?),
        Command::ResetQuiz { quiz_id } => {
            let mut store = open_store(&store_path)?;
            let mut user = storage::load_user_data(&store)?;
            gamification::reset_quiz_completion(&mut user, &quiz_id);
            storage::save_user_data(&mut store, &user)?;
            println!("Quiz {quiz_id} can award points again");
            Ok(())
        }
        Command::ResetProgress => {
            storage::reset_user_data(&mut open_store(&store_path)?)?;
            println!("Progress reset");
            Ok(())
        }
    }
}

fn open_store(path: &Path) -> anyhow::Result<FileStore> {
    FileStore::open(path).with_context(|| format!("Failed to open store {}", path.display()))
}

async fn generate(
    config: &Config,
    store: &mut FileStore,
    max_attempts: u32,
    skip_audio: bool,
    force: bool,
) -> anyhow::Result<()> {
    let source = OpenAiClient::from_config(config)?;
    let orchestrator = Orchestrator::new(source).max_attempts(max_attempts);
    let synthesizer = if skip_audio {
        None
    } else {
        Some(ElevenLabsClient::from_config(config)?)
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let mut progress = |message: &str, percent: f32| {
        pb.set_position(percent as u64);
        pb.set_message(message.to_string());
    };

    let result = if force {
        pipeline::generate_complete_lesson(
            &orchestrator,
            synthesizer.as_ref(),
            store,
            RATE_LIMIT_DELAY,
            &mut progress,
        )
        .await
    } else {
        pipeline::load_or_generate(
            &orchestrator,
            synthesizer.as_ref(),
            store,
            RATE_LIMIT_DELAY,
            &mut progress,
        )
        .await
    };
    pb.finish_and_clear();
    let complete = result.context("Lesson generation failed")?;

    println!("{}", complete.lesson.title);
    println!(
        "{} chunks, {} audio files, generated {}",
        complete.lesson.chunks.len(),
        complete.audio.len(),
        complete.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("Saved to {}", store.path().display());
    Ok(())
}

fn show(store: &FileStore, export: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(content) = storage::load_content(store)? else {
        let Some(saved) = storage::load_lesson(store)? else {
            bail!("No saved lesson. Run `lesson-generator generate` first.");
        };
        println!("{} (no audio)", saved.lesson.title);
        print_chunks(&saved.lesson);
        return Ok(());
    };

    println!("{} ({})", content.lesson.title, content.lesson.estimated_time);
    print_chunks(&content.lesson);

    let report = validation::lesson_report(&content.lesson);
    println!(
        "Darija quality: {:.0}% ({}/{} chunks valid)",
        report.ratio, report.passed_chunks, report.total_chunks
    );

    let mut player = PlaybackState::new(content.audio.len());
    player.toggle();
    while player.is_playing {
        let audio = &content.audio[player.current_chunk];
        println!(
            "[{}] {} ~{}",
            player.chunk_indicator(),
            audio.filename,
            format_time((audio.data.len() / MP3_BYTES_PER_SEC) as f64)
        );
        player.audio_ended();
    }

    if let Some(dir) = export {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for audio in &content.audio {
            let path = dir.join(&audio.filename);
            std::fs::write(&path, &audio.data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        println!("Exported {} audio files to {}", content.audio.len(), dir.display());
    }
    Ok(())
}

fn print_chunks(lesson: &darija_utils::Lesson) {
    for chunk in &lesson.chunks {
        println!();
        println!("{}. {} [{} - {}]", chunk.id, chunk.title, chunk.time_start, chunk.time_end);
        println!("{}", chunk.dialect_text);
        if !chunk.summary.is_empty() {
            println!("({})", chunk.summary);
        }
    }
    println!();
}

fn score(text: &str) {
    let verdict = quality::score(text);
    println!(
        "Score: {}/100 ({})",
        verdict.score,
        if verdict.passed { "pass" } else { "fail" }
    );
    println!(
        "Essential expressions: {}",
        patterns::find_in(text, &patterns::PATTERNS.essential).join(", ")
    );
    for issue in &verdict.issues {
        println!("- {issue}");
    }
}

fn submit_quiz(
    store: &mut FileStore,
    answers: &QuizAnswers,
    time_spent: u64,
    quiz_id: &str,
) -> anyhow::Result<()> {
    if !answers.can_submit() {
        bail!(
            "Progress: {}/{} - the essay needs at least {} words",
            answers.answered_count(),
            quiz::TOTAL_QUESTIONS,
            quiz::ESSAY_MIN_WORDS
        );
    }

    let results = quiz::evaluate(answers);
    for detail in &results.details {
        println!(
            "{} {}: {}",
            if detail.correct { "✓" } else { "✗" },
            detail.kind,
            detail.feedback
        );
    }
    println!("Score: {}/{}", results.score, results.total);
    storage::record_quiz_result(store, &results)?;

    let mut user: UserData = storage::load_user_data(store)?;
    let completion = gamification::complete_quiz(
        &mut user,
        results.score,
        results.total,
        time_spent,
        quiz_id,
        Utc::now(),
    );
    storage::save_user_data(store, &user)?;

    if completion.already_completed {
        println!("Quiz already completed, no points awarded");
    } else {
        println!("+{} points", completion.award.points_awarded);
    }
    if completion.award.leveled_up {
        let level = gamification::level_info(completion.award.new_level);
        println!("Level up! {} {} ({})", level.icon, level.name_en, level.name);
    }
    for badge in &completion.award.new_badges {
        println!("New badge: {} {} - {}", badge.icon, badge.name_en, badge.description_en);
    }

    match quiz::next_step(&results) {
        NextStep::ProceedToNextLesson => println!("Perfect! Lesson 2 is unlocked."),
        NextStep::Support { intro, items, tip } => {
            println!();
            println!("{intro}");
            for item in items {
                println!();
                println!("Question {}: {}", item.question, item.feedback);
                for line in item.explanation {
                    println!("  {line}");
                }
            }
            println!();
            println!("{tip}");
        }
    }
    Ok(())
}

fn stats(store: &FileStore) -> anyhow::Result<()> {
    let user = storage::load_user_data(store)?;
    let stats = gamification::user_stats(&user);
    let level = stats.level_info;

    println!(
        "Level {}: {} {} ({})",
        level.level, level.icon, level.name_en, level.name
    );
    println!("Points: {}", stats.total_points);
    match gamification::points_to_next_level(stats.total_points) {
        Some(remaining) => println!("Next level in {remaining} points"),
        None => println!("Maximum level reached"),
    }
    println!(
        "Quizzes: {}, lessons: {}, streak: {}",
        stats.quizzes_completed, stats.lessons_completed, stats.streak
    );
    for badge in &stats.badges {
        println!("{} {}", badge.icon, badge.name_en);
    }
    println!(
        "Lesson 1 completed: {}, quiz 1 passed: {}",
        storage::lesson_completed(store),
        storage::quiz_passed(store)
    );
    Ok(())
}
