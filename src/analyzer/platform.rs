//! Source-site detection used to steer the prompt wording.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformHint {
    /// Display name the title and tags should mention.
    pub name: &'static str,
}

struct PlatformEntry {
    needles: &'static [&'static str],
    hint: PlatformHint,
}

const fn entry(needles: &'static [&'static str], name: &'static str) -> PlatformEntry {
    PlatformEntry {
        needles,
        hint: PlatformHint { name },
    }
}

// Checked in order; the first entry with a matching needle wins.
static PLATFORMS: &[PlatformEntry] = &[
    entry(&["bilibili.com"], "哔哩哔哩"),
    entry(&["youtube.com", "youtu.be"], "YouTube"),
    entry(&["github.com"], "GitHub"),
    entry(&["gitlab.com"], "GitLab"),
    entry(&["gitee.com"], "Gitee"),
    entry(&["zhihu.com"], "知乎"),
    entry(&["weibo.com"], "微博"),
    entry(&["douyin.com", "tiktok.com"], "抖音"),
    entry(&["xiaohongshu"], "小红书"),
    entry(&["juejin.cn"], "稀土掘金"),
    entry(&["csdn.net"], "CSDN"),
    entry(&["segmentfault.com"], "思否"),
];

const CODE_HOSTS: &[&str] = &["github.com", "gitlab.com", "gitee.com", "bitbucket.org"];

/// Identify a well-known platform by substring match on the lowercased URL.
pub fn detect_platform(url: &str) -> Option<PlatformHint> {
    let url = url.to_lowercase();
    PLATFORMS
        .iter()
        .find(|p| p.needles.iter().any(|n| url.contains(n)))
        .map(|p| p.hint)
}

/// Whether the URL points at a code-hosting site. Independent of
/// [`detect_platform`]: Bitbucket is a code host without a display name.
pub fn is_code_repository(url: &str) -> bool {
    let url = url.to_lowercase();
    CODE_HOSTS.iter().any(|host| url.contains(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_video_sites() {
        let hint = detect_platform("https://www.bilibili.com/video/BV1xx").unwrap();
        assert_eq!(hint.name, "哔哩哔哩");
        assert_eq!(detect_platform("https://youtu.be/abc").unwrap().name, "YouTube");
        assert_eq!(detect_platform("https://www.tiktok.com/@x").unwrap().name, "抖音");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(
            detect_platform("https://GitHub.com/rust-lang/rust").unwrap().name,
            "GitHub"
        );
        assert!(is_code_repository("https://GITLAB.com/group/project"));
    }

    #[test]
    fn test_bitbucket_is_code_host_without_platform() {
        let url = "https://bitbucket.org/team/repo";
        assert!(is_code_repository(url));
        assert_eq!(detect_platform(url), None);
    }

    #[test]
    fn test_article_sites() {
        assert_eq!(detect_platform("https://juejin.cn/post/1").unwrap().name, "稀土掘金");
        assert_eq!(
            detect_platform("https://blog.csdn.net/u/article/1").unwrap().name,
            "CSDN"
        );
        assert!(!is_code_repository("https://juejin.cn/post/1"));
    }

    #[test]
    fn test_unknown_site() {
        assert_eq!(detect_platform("https://example.com/go"), None);
        assert!(!is_code_repository("https://example.com/go"));
    }
}
