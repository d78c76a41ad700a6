//! Reply formatting. All output uses Telegram Markdown.

use chrono::NaiveDate;

use crate::db::{Book, ChapterVerse, Verse};

/// Chapters are rendered at most this many verses at a time to stay under
/// Telegram's message size limit.
const CHAPTER_VERSE_CAP: usize = 30;

pub fn verse_block(verse: &Verse) -> String {
    format!(
        "📖 *{} {}:{}*\n_{}_",
        verse.book_name, verse.chapter, verse.verse, verse.text
    )
}

pub fn search_results(keyword: &str, verses: &[Verse]) -> String {
    let mut out = format!("🔍 *Found {} verse(s) for '{}':*\n\n", verses.len(), keyword);
    for verse in verses {
        out.push_str(&verse_block(verse));
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

pub fn topic_results(topic: &str, verses: &[Verse]) -> String {
    let mut out = format!("📚 *Topic: {}*\n\n", title_case(topic));
    for verse in verses {
        out.push_str(&verse_block(verse));
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

pub fn topics_overview(topics: &[String]) -> String {
    let mut out = String::from("📚 *Available Topics:*\n\n");
    for (i, topic) in topics.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, title_case(topic)));
    }
    out.push_str("\n*Usage:* /topic <name>\n*Example:* /topic salvation");
    out
}

pub fn votd_message(verse: &Verse, date: NaiveDate) -> String {
    format!(
        "🌅 *Verse of the Day*\n📅 _{}_\n\n{}\n\n🙏 Have a blessed day!",
        date.format("%B %d, %Y"),
        verse_block(verse)
    )
}

/// The scheduled daily message; formatted once per tick and reused for
/// every matching subscriber.
pub fn daily_message(verse: &Verse, date: NaiveDate) -> String {
    format!(
        "🌅 *Good Morning! Daily Verse*\n📅 _{}_\n\n{}\n\n🙏 Have a blessed day!\n\n_Reply /unsubscribe to stop daily verses_",
        date.format("%B %d, %Y"),
        verse_block(verse)
    )
}

pub fn random_message(verse: &Verse) -> String {
    format!("🎲 *Random Verse*\n\n{}", verse_block(verse))
}

pub fn chapter_message(book_fragment: &str, chapter: i64, verses: &[ChapterVerse]) -> String {
    let mut out = format!("📖 *{} Chapter {}*\n\n", title_case(book_fragment), chapter);
    for cv in verses.iter().take(CHAPTER_VERSE_CAP) {
        out.push_str(&format!("*{}.* {}\n\n", cv.verse, cv.text));
    }
    if verses.len() > CHAPTER_VERSE_CAP {
        out.push_str(&format!(
            "_(Showing {} of {} verses)_",
            CHAPTER_VERSE_CAP,
            verses.len()
        ));
    }
    out.trim_end().to_string()
}

pub fn book_results(book_fragment: &str, verses: &[Verse]) -> String {
    let mut out = format!("📚 *Verses from {}:*\n\n", title_case(book_fragment));
    for verse in verses {
        out.push_str(&verse_block(verse));
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

pub fn books_overview(books: &[Book]) -> String {
    let old: Vec<&str> = books
        .iter()
        .filter(|b| b.testament == "Old")
        .map(|b| b.book_name.as_str())
        .collect();
    let new: Vec<&str> = books
        .iter()
        .filter(|b| b.testament == "New")
        .map(|b| b.book_name.as_str())
        .collect();
    format!(
        "📚 *Bible Books*\n\n*Old Testament ({}):*\n{}\n\n*New Testament ({}):*\n{}",
        old.len(),
        old.join(", "),
        new.len(),
        new.join(", ")
    )
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(book: &str, chapter: i64, number: i64, text: &str) -> Verse {
        Verse {
            id: 1,
            book_name: book.into(),
            chapter,
            verse: number,
            text: text.into(),
        }
    }

    #[test]
    fn verse_block_layout() {
        let v = verse("John", 3, 16, "For God so loved the world");
        assert_eq!(
            verse_block(&v),
            "📖 *John 3:16*\n_For God so loved the world_"
        );
    }

    #[test]
    fn daily_message_mentions_unsubscribe() {
        let v = verse("John", 3, 16, "For God so loved the world");
        let date = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        let msg = daily_message(&v, date);
        assert!(msg.contains("August 08, 2026"));
        assert!(msg.contains("/unsubscribe"));
        assert!(msg.contains("John 3:16"));
    }

    #[test]
    fn chapter_message_caps_at_thirty_verses() {
        let verses: Vec<ChapterVerse> = (1..=40)
            .map(|n| ChapterVerse {
                verse: n,
                text: format!("verse {n}"),
            })
            .collect();
        let msg = chapter_message("psalm", 119, &verses);
        assert!(msg.contains("*30.*"));
        assert!(!msg.contains("*31.*"));
        assert!(msg.contains("(Showing 30 of 40 verses)"));

        let short: Vec<ChapterVerse> = verses.into_iter().take(3).collect();
        let msg = chapter_message("psalm", 23, &short);
        assert!(!msg.contains("Showing"));
    }

    #[test]
    fn books_overview_splits_testaments() {
        let books = vec![
            Book {
                book_id: 1,
                book_name: "Genesis".into(),
                testament: "Old".into(),
            },
            Book {
                book_id: 2,
                book_name: "Matthew".into(),
                testament: "New".into(),
            },
        ];
        let msg = books_overview(&books);
        assert!(msg.contains("*Old Testament (1):*\nGenesis"));
        assert!(msg.contains("*New Testament (1):*\nMatthew"));
    }

    #[test]
    fn title_case_handles_multiword_names() {
        assert_eq!(title_case("song of solomon"), "Song Of Solomon");
        assert_eq!(title_case("john"), "John");
    }
}
