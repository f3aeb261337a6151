use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("`{first}` and `{second}` both normalize to base key `{key}`")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("filename `{filename}` appears more than once{}", theme_suffix(.theme))]
    DuplicateFilename {
        filename: String,
        theme: Option<String>,
    },
    #[error("slide {slide} is shared by `{first}` and `{second}`{}", theme_suffix(.theme))]
    DuplicateSlide {
        slide: u32,
        first: String,
        second: String,
        theme: Option<String>,
    },
    #[error("slide {slide} for `{filename}` is already taken by `{existing}`")]
    SlideCollision {
        slide: u32,
        filename: String,
        existing: String,
    },
    #[error("slide numbers exhausted before `{0}` could be numbered")]
    SlideOverflow(String),
    #[error("no slide number given for `{0}`")]
    Unresolved(String),
}

fn theme_suffix(theme: &Option<String>) -> String {
    theme
        .as_deref()
        .map(|t| format!(" in theme `{}`", t))
        .unwrap_or_default()
}
