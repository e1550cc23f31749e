use shared::Category;
use strum::IntoEnumIterator;

fn category_rule(category: Category) -> &'static str {
    match category {
        Category::Shopping => "Amazon, product pages, things to buy",
        Category::Reading => "Books, book covers, reading lists",
        Category::Cooking => "Recipes, food items",
        Category::Articles => "Blog posts, articles to read",
        Category::Other => "Everything else",
    }
}

fn build_task_prompt() -> String {
    let categories = Category::iter()
        .map(|category| category.to_string())
        .collect::<Vec<_>>()
        .join("|");
    let rules = Category::iter()
        .map(|category| format!("- {}: {}", category, category_rule(category)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze this screenshot and extract a to-do task. Return ONLY a JSON object with this exact structure:
{{
  "task": "Brief action item (e.g., 'Read [Book Title]', 'Buy [Product Name]')",
  "category": "{categories}",
  "metadata": {{
    "title": "Item/book/product title if visible",
    "price": "Price if visible (e.g., '$29.99')",
    "author": "Author if book",
    "urgency": "any time-sensitive info like 'Sale ends Friday' or 'Limited stock'"
  }},
  "notes": "Additional relevant details"
}}

Categories:
{rules}

Be concise and actionable. Return ONLY the JSON, no other text."#
    )
}

lazy_static::lazy_static! {
    /// Instruction sent alongside every screenshot.
    pub static ref TASK_PROMPT: String = build_task_prompt();
}
