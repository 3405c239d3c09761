mod graph_backward;
mod post_accumulate_hook;
