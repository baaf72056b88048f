//! Static registry of command-line flags.
//!
//! The rebuilt command line and the argument parser both read from this
//! table. It also carries the multi-letter single-dash spellings (`-ov`,
//! `-nord`, ...) that clap cannot express as short flags; those are rewritten
//! to their long form before parsing.
use crate::params::Param;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub long: &'static str,
    pub short: Option<char>,
    pub legacy: &'static [&'static str],
    /// The spelling used when a command line is rebuilt.
    pub render: &'static str,
    pub takes_value: bool,
}

const fn flag(
    name: &'static str,
    short: Option<char>,
    legacy: &'static [&'static str],
    render: &'static str,
    takes_value: bool,
) -> FlagSpec {
    FlagSpec {
        name,
        long: name,
        short,
        legacy,
        render,
        takes_value,
    }
}

const FLAGS: [FlagSpec; 19] = [
    flag("username", Some('u'), &[], "-u", true),
    flag("password", Some('p'), &[], "-p", true),
    flag("process", Some('r'), &["-prc"], "-r", true),
    flag("input_val", Some('i'), &[], "-i", true),
    flag("collections", Some('c'), &[], "-c", true),
    flag("filters", Some('f'), &[], "-f", true),
    flag("dates", Some('d'), &[], "-d", true),
    flag("maximum", Some('m'), &["-max"], "-m", true),
    flag("priority", Some('l'), &["-pri"], "-l", true),
    flag("output", Some('o'), &[], "-o", true),
    flag("aws", Some('a'), &[], "-a", false),
    flag("overlap", None, &["-ov"], "-ov", true),
    flag("orderitems", None, &["-oid"], "-oid", true),
    flag("no_order", None, &["-nord"], "-nord", false),
    flag("downloads", None, &["-dn"], "-dn", true),
    flag("silent", Some('s'), &[], "-s", false),
    flag("version", Some('v'), &[], "-v", false),
    flag("config", None, &[], "--config", true),
    flag("catalog", None, &[], "--catalog", true),
];

#[derive(Debug, Clone, Copy)]
pub struct FlagRegistry {
    flags: &'static [FlagSpec],
}

impl Default for FlagRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FlagRegistry {
    pub fn standard() -> Self {
        Self { flags: &FLAGS }
    }

    pub fn flags(&self) -> &'static [FlagSpec] {
        self.flags
    }

    pub fn get(&self, name: &str) -> Option<&'static FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn for_param(&self, param: Param) -> Option<&'static FlagSpec> {
        self.get(param.name())
    }

    /// Finds the flag a command-line token spells, in any of its forms.
    fn lookup(&self, token: &str) -> Option<&'static FlagSpec> {
        let token = token.split('=').next().unwrap_or(token);
        self.flags.iter().find(|f| {
            token.strip_prefix("--") == Some(f.long)
                || f.legacy.contains(&token)
                || f.short.map_or(false, |s| token == format!("-{}", s))
        })
    }

    /// Rewrites legacy spellings (`-ov 40`, `-nord`, `-max=5`) to long flags.
    /// The first argument is the program name and is left alone, as is
    /// anything after `--` or in a value position.
    pub fn normalize_args<I, S>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = vec![];
        let mut expect_value = false;
        let mut passthrough = false;

        for (i, arg) in args.into_iter().enumerate() {
            let arg: String = arg.into();
            if i == 0 || passthrough || expect_value {
                expect_value = false;
                out.push(arg);
                continue;
            }
            if arg == "--" {
                passthrough = true;
                out.push(arg);
                continue;
            }

            let (token, value) = match arg.split_once('=') {
                Some((t, v)) => (t.to_string(), Some(v.to_string())),
                None => (arg.clone(), None),
            };
            let legacy = self
                .flags
                .iter()
                .find(|f| f.legacy.contains(&token.as_str()));
            let rewritten = match (legacy, &value) {
                (Some(f), Some(v)) => format!("--{}={}", f.long, v),
                (Some(f), None) => format!("--{}", f.long),
                (None, _) => arg.clone(),
            };
            expect_value = value.is_none()
                && self.lookup(&token).map_or(false, |f| f.takes_value);
            out.push(rewritten);
        }
        out
    }
}
