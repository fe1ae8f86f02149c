// Pipeline orchestration — ties corpus loading, scoring, and labeling together.

pub mod classify;
