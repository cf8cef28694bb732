use crate::models::CategoryRequest;

pub const IMAGE_INSTRUCTION: &str = include_str!("../data/prompts/image_instruction.txt");
pub const CATEGORY_SYSTEM: &str = include_str!("../data/prompts/category_system.txt");
pub const CATEGORY_USER: &str = include_str!("../data/prompts/category_user.txt");
pub const OLED_INSTRUCTION: &str = include_str!("../data/prompts/oled_instruction.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// System message for the category provider, with the OLED rule only when asked for.
pub fn category_system(oled: bool) -> String {
    let oled_line = if oled {
        format!("- {}\n", OLED_INSTRUCTION.trim())
    } else {
        String::new()
    };
    render(CATEGORY_SYSTEM.trim(), &[("oled_instruction", &oled_line)])
}

pub fn category_user(request: &CategoryRequest) -> String {
    render(
        CATEGORY_USER.trim(),
        &[
            ("category", &request.category),
            ("visual_style", &request.visual_style),
        ],
    )
}
