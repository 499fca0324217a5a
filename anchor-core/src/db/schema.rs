pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS themed_verses (
    reference_code TEXT PRIMARY KEY,
    book TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verse INTEGER NOT NULL,
    theme TEXT NOT NULL CHECK (theme IN ('rest', 'strength', 'peace', 'wisdom', 'love', 'faith', 'joy'))
);

CREATE TABLE IF NOT EXISTS verse_of_the_day (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    version TEXT NOT NULL,
    book TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verse INTEGER NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- A (date, version) pair maps to exactly one cached verse
CREATE UNIQUE INDEX IF NOT EXISTS idx_votd_date_version
    ON verse_of_the_day(date, version);

CREATE TABLE IF NOT EXISTS chapter_audio (
    id TEXT PRIMARY KEY,
    book_name TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    version TEXT NOT NULL,
    audio_url TEXT NOT NULL,
    duration REAL NOT NULL,
    generated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_chapter_audio_key
    ON chapter_audio(book_name, chapter, version);

CREATE TABLE IF NOT EXISTS image_presets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    image_url TEXT NOT NULL,
    category TEXT NOT NULL,
    tags JSON NOT NULL DEFAULT '[]',
    sort_order INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_presets_category ON image_presets(category);

CREATE TABLE IF NOT EXISTS favorites (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    book TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verse INTEGER NOT NULL,
    version TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_favorites_user ON favorites(user_id);

-- Duplicate saves are a conflict, not an overwrite
CREATE UNIQUE INDEX IF NOT EXISTS idx_favorites_unique
    ON favorites(user_id, book, chapter, verse, version);

CREATE TABLE IF NOT EXISTS ai_usage (
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, date)
);
"#;

/// Static verse library behind the weekly theme rotation. The reference
/// table is read-only at runtime; a fresh database gets this curated set so
/// every theme has candidates.
pub const THEMED_VERSE_SEED: &str = r#"
INSERT OR IGNORE INTO themed_verses (reference_code, book, chapter, verse, theme) VALUES
    ('MAT.11.28', 'Matthew', 11, 28, 'rest'),
    ('PSA.23.2', 'Psalms', 23, 2, 'rest'),
    ('EXO.33.14', 'Exodus', 33, 14, 'rest'),
    ('PSA.62.1', 'Psalms', 62, 1, 'rest'),
    ('PHP.4.13', 'Philippians', 4, 13, 'strength'),
    ('ISA.40.31', 'Isaiah', 40, 31, 'strength'),
    ('JOS.1.9', 'Joshua', 1, 9, 'strength'),
    ('PSA.46.1', 'Psalms', 46, 1, 'strength'),
    ('JHN.14.27', 'John', 14, 27, 'peace'),
    ('PHP.4.7', 'Philippians', 4, 7, 'peace'),
    ('ISA.26.3', 'Isaiah', 26, 3, 'peace'),
    ('PSA.29.11', 'Psalms', 29, 11, 'peace'),
    ('PRO.3.5', 'Proverbs', 3, 5, 'wisdom'),
    ('JAS.1.5', 'James', 1, 5, 'wisdom'),
    ('PRO.2.6', 'Proverbs', 2, 6, 'wisdom'),
    ('PSA.90.12', 'Psalms', 90, 12, 'wisdom'),
    ('JHN.3.16', 'John', 3, 16, 'love'),
    ('1CO.13.4', '1 Corinthians', 13, 4, 'love'),
    ('ROM.8.38', 'Romans', 8, 38, 'love'),
    ('1JN.4.19', '1 John', 4, 19, 'love'),
    ('HEB.11.1', 'Hebrews', 11, 1, 'faith'),
    ('MRK.11.24', 'Mark', 11, 24, 'faith'),
    ('2CO.5.7', '2 Corinthians', 5, 7, 'faith'),
    ('ROM.10.17', 'Romans', 10, 17, 'faith'),
    ('PSA.118.24', 'Psalms', 118, 24, 'joy'),
    ('NEH.8.10', 'Nehemiah', 8, 10, 'joy'),
    ('JHN.15.11', 'John', 15, 11, 'joy'),
    ('ROM.15.13', 'Romans', 15, 13, 'joy');
"#;
