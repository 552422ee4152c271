// 命令模块
// 提供供外层接口（CLI 等）调用的命令

pub mod assistant;

pub use assistant::{
    ask_question,
    evaluate_math,
    get_history,
    AppState,
    InteractionDto,
};
