//! Async → sync client conversion
//!
//! The sync client is not a separate template: it is the rendered async
//! client rewritten line by line.

use regex::Regex;
use std::sync::LazyLock;

static RE_ASYNC_DEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"async def").unwrap());
static RE_AWAIT_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"await (.*?)\(").unwrap());
static RE_ASYNC_WITH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"async with (.*?) as (.*?):").unwrap());
static RE_ASYNCIO_SLEEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"asyncio\.sleep\(").unwrap());

/// Rewrite async Python client code into its blocking equivalent
///
/// - `async def` → `def`
/// - `await f(` → `f(`
/// - `aiohttp` session → `requests` session
/// - `async with x as y:` → `with x as y:`
pub fn convert_to_sync(async_code: &str) -> String {
    let code = RE_ASYNC_DEF.replace_all(async_code, "def");
    let code = RE_AWAIT_CALL.replace_all(&code, "$1(");
    let code = code
        .replace("import aiohttp", "import requests")
        .replace("aiohttp.ClientSession()", "requests.Session()")
        .replace("import asyncio", "import time");
    let code = RE_ASYNCIO_SLEEP.replace_all(&code, "time.sleep(");
    RE_ASYNC_WITH
        .replace_all(&code, "with $1 as $2:")
        .into_owned()
}
