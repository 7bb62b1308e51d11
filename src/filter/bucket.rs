// src/filter/bucket.rs
//! 桶实现 - 一组定长指纹槽位的线性扫描操作
//!
//! 桶本身不持有内存，它是 [`Table`](super::table::Table) 连续槽位数组上的一个视图。

use std::fmt;

use crate::types::Fingerprint;

/// 只读桶视图
#[derive(Clone, Copy)]
pub struct Bucket<'a> {
    slots: &'a [Fingerprint],
}

impl fmt::Debug for Bucket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket(occupied: {}/{})", self.occupied(), self.slots.len())
    }
}

impl<'a> Bucket<'a> {
    pub fn new(slots: &'a [Fingerprint]) -> Self {
        Self { slots }
    }

    /// 返回桶中所有槽位
    pub fn slots(&self) -> &'a [Fingerprint] {
        self.slots
    }

    /// 第一个空槽位
    pub fn find_empty(&self) -> Option<usize> {
        self.slots.iter().position(Fingerprint::is_zero)
    }

    /// 第一个等于 `fp` 的槽位
    pub fn find_fingerprint(&self, fp: Fingerprint) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == fp)
    }

    pub fn contains(&self, fp: Fingerprint) -> bool {
        self.find_fingerprint(fp).is_some()
    }

    /// 已占用槽位数
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_zero()).count()
    }

    pub fn is_full(&self) -> bool {
        self.find_empty().is_none()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }
}

/// 可写桶视图
pub struct BucketMut<'a> {
    slots: &'a mut [Fingerprint],
}

impl fmt::Debug for BucketMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_bucket().fmt(f)
    }
}

impl<'a> BucketMut<'a> {
    pub fn new(slots: &'a mut [Fingerprint]) -> Self {
        Self { slots }
    }

    pub fn as_bucket(&self) -> Bucket<'_> {
        Bucket::new(self.slots)
    }

    pub fn find_empty(&self) -> Option<usize> {
        self.as_bucket().find_empty()
    }

    pub fn find_fingerprint(&self, fp: Fingerprint) -> Option<usize> {
        self.as_bucket().find_fingerprint(fp)
    }

    /// 直接写入槽位
    pub fn place(&mut self, slot_idx: usize, fp: Fingerprint) {
        debug_assert!(!fp.is_zero());
        self.slots[slot_idx] = fp;
    }

    /// 把槽位重置为空
    pub fn clear(&mut self, slot_idx: usize) {
        self.slots[slot_idx] = Fingerprint::EMPTY;
    }

    /// 写入 `fp` 并返回槽位中原来的指纹
    pub fn swap(&mut self, slot_idx: usize, fp: Fingerprint) -> Fingerprint {
        std::mem::replace(&mut self.slots[slot_idx], fp)
    }

    /// 放入第一个空槽位，桶已满时返回 false
    pub fn try_place(&mut self, fp: Fingerprint) -> bool {
        match self.find_empty() {
            Some(slot_idx) => {
                self.place(slot_idx, fp);
                true
            }
            None => false,
        }
    }

    /// 清除第一个等于 `fp` 的槽位
    pub fn remove(&mut self, fp: Fingerprint) -> bool {
        match self.find_fingerprint(fp) {
            Some(slot_idx) => {
                self.clear(slot_idx);
                true
            }
            None => false,
        }
    }
}
