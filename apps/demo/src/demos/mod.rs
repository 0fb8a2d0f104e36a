//! 演示程序注册表
//!
//! 注册表是一份静态声明的列表，按注册名的字典序排列，构造后只读。

use anyhow::Result;

use crate::session::Session;

mod cube;
mod greeting;
mod infos;
mod manual;

/// 演示程序入口
pub type DemoHandler = fn(&mut Session) -> Result<()>;

/// 注册项
#[derive(Clone, Copy)]
pub struct DemoEntry {
    /// 注册名（决定菜单顺序）
    pub name: &'static str,
    /// 菜单文本
    pub label: &'static str,
    pub handler: DemoHandler,
}

impl std::fmt::Debug for DemoEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoEntry")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

/// 内置演示程序
const BUILTIN_DEMOS: [DemoEntry; 4] = [
    DemoEntry {
        name: "demo_00_infos",
        label: infos::LABEL,
        handler: infos::run,
    },
    DemoEntry {
        name: "demo_01_greeting",
        label: greeting::LABEL,
        handler: greeting::run,
    },
    DemoEntry {
        name: "demo_02_cube",
        label: cube::LABEL,
        handler: cube::run,
    },
    DemoEntry {
        name: "demo_03_manual",
        label: manual::LABEL,
        handler: manual::run,
    },
];

/// 有序注册表
#[derive(Debug, Clone)]
pub struct DemoRegistry {
    entries: Vec<DemoEntry>,
}

impl DemoRegistry {
    /// 按注册名排序构造
    pub fn new(mut entries: Vec<DemoEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(b.name));
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_DEMOS.to_vec())
    }

    /// 菜单文本，按菜单顺序
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.label).collect()
    }

    /// 注册名，按菜单顺序
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// 第 `index` 项（从 0 开始）
    ///
    /// # Panics
    /// 下标越界时 panic；菜单只会返回范围内的下标。
    pub fn get(&self, index: usize) -> &DemoEntry {
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
