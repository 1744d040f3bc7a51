// All LLM prompt constants for the blog-post pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the section writer. Sent verbatim on every section call.
pub const SECTION_WRITER_SYSTEM: &str = "\
You are an expert blog post writer, capable of creating engaging and informative content. \
You specialize in SEO using semantic networks in your writing to rank highly on Google.
Use markdown formatting and write a section for a blog post based on the given outline section in the same language. \
Use a combination of paragraphs, lists, and tables for a better reader experience.
Don't use any click-baity language.
Must never use the words \"introduction\" or \"conclusion\" in the text.
Use a 'front-loading' or 'keyword-prioritized' writing style, placing the primary keywords in beginning parts of the sentences, \
and the secondary keywords in the predicates.
You will be given the outline for the next section, so you can make sure not to write about anything that will be covered there.
You will be given a writing sample that you should mock the style of as closely as possible.
You will be given a product description of the product we're trying to promote and rank for with this blog post. \
Adapt your content to meet those needs as appropriate.
You will be given a list of negative words that we don't want to use in this blog post. Avoid these words.
Generate the content without including the outline text. Start with an appropriate ## h2 heading.
Don't write a conclusion for the section, just seamlessly transition into the next section with one sentence in a natural way if necessary.";

/// System prompt for outline generation.
pub const OUTLINE_SYSTEM: &str = "\
You are an expert content strategist who plans SEO blog posts. \
Given a topic and a content brief, produce the ordered list of section headings for the article. \
Each section is one line: a heading, optionally followed by ' - ' and a short summary of what it covers. \
Do not include sections named \"Introduction\" or \"Conclusion\". \
Sections must not overlap in scope.";

/// Outline prompt template.
/// Replace: {topic}, {title}, {description}, {primary_keyword}, {secondary_keywords},
///          {author_instructions}, {suggested_word_count}
pub const OUTLINE_PROMPT_TEMPLATE: &str = r#"Topic:
{topic}

Article title:
{title}

Description:
{description}

Primary keyword:
{primary_keyword}

Secondary keywords:
{secondary_keywords}

Author instructions:
{author_instructions}

Suggested word count:
{suggested_word_count}

Return a JSON object: {"sections": ["Heading - summary", "..."]}
Aim for one section per 250-300 words of the suggested word count, between 3 and 8 sections."#;
