//! User-facing reply text

/// Reply to `/start` and `/help`
pub const USAGE: &str = "Hi! I'm a free image generator bot. Send me a description of an image, \
     for example: 'A cat in a spaceship'. Note: generating an image can take a while.";

/// Reply when anything goes wrong while serving a prompt
pub const GENERATION_FAILED: &str =
    "An error occurred while generating the image. Please try again later.";

/// Reply from the outer error hook
pub const UNHANDLED_ERROR: &str = "An error occurred. Please try again.";

/// Acknowledgement sent as soon as a prompt arrives
pub fn processing(prompt: &str) -> String {
    format!(
        "Processing: {}... Please wait (this can take 10-30 seconds).",
        prompt
    )
}

/// Caption attached to the generated photo
pub fn caption(prompt: &str) -> String {
    format!("Image for: {}", prompt)
}

/// Reply when the inference API refuses a prompt
pub fn rejected(body: &str) -> String {
    format!("Failed to generate image: {}", body)
}
