mod helpers;
mod test_publish;
mod test_push_tags;
