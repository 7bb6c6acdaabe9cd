//! Prompt construction. Platform hints only change the wording; nothing here
//! is checked against the model's answer.

use crate::analyzer::platform::{detect_platform, is_code_repository};

pub fn build_prompt(url: &str, content: Option<&str>) -> String {
    let platform = detect_platform(url).map(|p| p.name);
    let code_repo = is_code_repository(url);

    let mut prompt = String::from(
        "请仔细阅读下面的网页内容，不要遗漏关键信息，并生成：\n\n\
         1. 一个简洁的中文标题（不超过40字）\n",
    );

    if code_repo {
        prompt.push_str(&repository_rules(platform));
    }
    if let Some(name) = platform {
        prompt.push_str(&platform_rules(name));
    }

    prompt.push_str(
        "\n2. 一段中文描述（80-150字）\n\
         - 写清核心功能、主要特性、技术栈、适用场景，以及项目名称、作者、发布时间等已知信息\n\
         - 直接描述内容本身，不要写“该网页介绍了”“用户可以通过……访问”之类的套话\n\
         - 技术文章要写出主题、涉及的技术和解决的问题\n",
    );

    prompt.push_str("\n3. 8-15个中文标签（数组）\n");
    if let Some(name) = platform {
        prompt.push_str(&format!("- 必须包含平台名称“{name}”\n"));
    }
    prompt.push_str(
        "- 覆盖技术栈（如 Vue、React、Rust、Python）\n\
         - 覆盖内容类型（如 视频、文章、教程、代码仓库、博客）\n\
         - 覆盖功能特性（如 组件库、管理后台、API、工具）\n\
         - 覆盖应用场景（如 前端开发、后端开发、学习）\n\
         - 标签要具体、便于检索，避免过于宽泛\n",
    );

    let body = match content {
        Some(content) if !content.trim().is_empty() => content.to_string(),
        _ => format!("网址：{url}"),
    };
    prompt.push_str(&format!("\n网址：{url}\n{body}\n"));

    prompt.push_str(
        "\n只返回一个 JSON 对象，格式如下：\n\
         {\n  \"title\": \"标题\",\n  \"description\": \"描述\",\n  \"tags\": [\"标签1\", \"标签2\"]\n}",
    );
    prompt
}

fn repository_rules(platform: Option<&str>) -> String {
    let format = match platform {
        Some(name) => format!("“项目名称 - 项目描述 - {name}”"),
        None => "“项目名称 - 项目描述”".to_string(),
    };
    format!(
        "- 这是代码仓库页面：标题必须同时包含项目名称（通常是仓库名）和平台名称\n\
         - 标题格式：{format}，平台名称放在最后，不能省略\n"
    )
}

fn platform_rules(name: &str) -> String {
    format!(
        "- 内容来自 {name}：标题末尾必须标注平台名称，例如“内容标题 - {name}”\n\
         - 如果能判断内容类型（视频、文章、代码仓库、教程等），也在标题和标签中体现\n"
    )
}
