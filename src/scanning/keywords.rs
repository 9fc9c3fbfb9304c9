//! Fixed tables of Perl builtins consulted by the scanner

use std::collections::HashSet;
use std::sync::LazyLock;

macro_rules! table {
    ($($word:literal)*) => {
        LazyLock::new(|| HashSet::from([$($word),*]))
    };
}

/// Builtin functions and named operators. A bareword in this set is
/// classified as a keyword unless the preceding token expects a plain name.
static BUILTINS: LazyLock<HashSet<&'static str>> = table!(
    "abs" "accept" "alarm" "and" "atan2" "bind" "binmode" "bless" "break"
    "caller" "chdir" "chmod" "chomp" "chop" "chown" "chr" "chroot" "close"
    "closedir" "cmp" "connect" "continue" "cos" "crypt" "dbmclose" "dbmopen"
    "default" "defined" "delete" "die" "do" "dump" "each" "else" "elsif"
    "endgrent" "endhostent" "endnetent" "endprotoent" "endpwent" "endservent"
    "eof" "eq" "eval" "evalbytes" "exec" "exists" "exit" "exp" "fc" "fcntl"
    "fileno" "flock" "for" "foreach" "fork" "format" "formline" "ge" "getc"
    "getgrent" "getgrgid" "getgrnam" "gethostbyaddr" "gethostbyname"
    "gethostent" "getlogin" "getnetbyaddr" "getnetbyname" "getnetent"
    "getpeername" "getpgrp" "getppid" "getpriority" "getprotobyname"
    "getprotobynumber" "getprotoent" "getpwent" "getpwnam" "getpwuid"
    "getservbyname" "getservbyport" "getservent" "getsockname" "getsockopt"
    "given" "glob" "gmtime" "goto" "grep" "gt" "hex" "if" "index" "int"
    "ioctl" "join" "keys" "kill" "last" "lc" "lcfirst" "le" "length" "link"
    "listen" "local" "localtime" "lock" "log" "lstat" "lt" "map" "mkdir"
    "msgctl" "msgget" "msgrcv" "msgsnd" "my" "ne" "next" "no" "not" "oct"
    "open" "opendir" "or" "ord" "our" "pack" "package" "pipe" "pop" "pos"
    "print" "printf" "prototype" "push" "quotemeta" "rand" "read" "readdir"
    "readline" "readlink" "readpipe" "recv" "redo" "ref" "rename" "require"
    "reset" "return" "reverse" "rewinddir" "rindex" "rmdir" "say" "scalar"
    "seek" "seekdir" "select" "semctl" "semget" "semop" "send" "setgrent"
    "sethostent" "setnetent" "setpgrp" "setpriority" "setprotoent"
    "setpwent" "setservent" "setsockopt" "shift" "shmctl" "shmget"
    "shmread" "shmwrite" "shutdown" "sin" "sleep" "socket" "socketpair"
    "sort" "splice" "split" "sprintf" "sqrt" "srand" "stat" "state" "study"
    "sub" "substr" "symlink" "syscall" "sysopen" "sysread" "sysseek"
    "system" "syswrite" "tell" "telldir" "tie" "tied" "time" "times"
    "truncate" "uc" "ucfirst" "umask" "undef" "unless" "unlink" "unpack"
    "unshift" "untie" "until" "use" "utime" "values" "vec" "wait" "waitpid"
    "wantarray" "warn" "when" "while" "write" "x" "xor"
    "BEGIN" "END" "INIT" "CHECK" "UNITCHECK" "DESTROY" "AUTOLOAD"
    "__FILE__" "__LINE__" "__PACKAGE__" "__SUB__"
);

/// Named operators; these behave like punctuation operators for the
/// purposes of deciding what may follow them.
static NAMED_OPERATORS: LazyLock<HashSet<&'static str>> = table!(
    "and" "or" "not" "xor" "x" "lt" "gt" "le" "ge" "eq" "ne" "cmp"
);

/// Keywords after which the next word is a name rather than a keyword.
static EXPECTS_WORD: LazyLock<HashSet<&'static str>> = table!(
    "sub" "package" "use" "no" "require" "goto" "last" "next" "redo" "dump"
    "format"
);

/// Keywords that take a block, possibly after a parenthesized expression.
static EXPECTS_BLOCK: LazyLock<HashSet<&'static str>> = table!(
    "if" "elsif" "unless" "else" "while" "until" "for" "foreach" "given"
    "when" "default" "continue" "sub" "do" "eval" "package" "map" "grep"
    "sort" "BEGIN" "END" "INIT" "CHECK" "UNITCHECK" "try" "catch" "finally"
    "defer"
);

/// Keywords whose block, once closed, also closes the statement.
static ENDS_STATEMENT: LazyLock<HashSet<&'static str>> = table!(
    "if" "elsif" "unless" "else" "while" "until" "for" "foreach" "given"
    "when" "default" "continue" "sub" "package" "BEGIN" "END" "INIT" "CHECK"
    "UNITCHECK" "try" "catch" "finally" "defer"
);

/// Blocks whose contents only run under some condition.
static CONDITIONAL_BLOCK: LazyLock<HashSet<&'static str>> = table!(
    "if" "elsif" "unless" "else" "while" "until" "for" "foreach" "given"
    "when" "default" "sub" "map" "grep" "sort" "catch" "END"
);

/// Keywords which may be followed directly by a pattern match.
static PATTERN_MAY_FOLLOW: LazyLock<HashSet<&'static str>> = table!(
    "split" "grep" "map" "join" "if" "elsif" "unless" "while" "until" "and"
    "or" "not" "xor" "return" "when" "push" "unshift" "x" "lt" "gt" "le"
    "ge" "eq" "ne" "cmp" "defined" "ref" "scalar" "print" "say" "die"
    "warn"
);

/// Builtins that may take a filehandle block or a list in braces, where a
/// following '{' is a block rather than an anonymous hash.
static BLOCK_LIST: LazyLock<HashSet<&'static str>> = table!(
    "map" "grep" "sort" "print" "printf" "say" "exec" "system"
);

pub fn is_builtin(word: &str) -> bool {
    BUILTINS.contains(word)
}

pub fn is_named_operator(word: &str) -> bool {
    NAMED_OPERATORS.contains(word)
}

pub fn expects_word(word: &str) -> bool {
    EXPECTS_WORD.contains(word)
}

pub fn expects_block(word: &str) -> bool {
    EXPECTS_BLOCK.contains(word) || BLOCK_LIST.contains(word)
}

pub fn ends_statement(word: &str) -> bool {
    ENDS_STATEMENT.contains(word)
}

pub fn is_conditional_block(word: &str) -> bool {
    CONDITIONAL_BLOCK.contains(word)
}

pub fn pattern_may_follow(word: &str) -> bool {
    PATTERN_MAY_FOLLOW.contains(word)
}

/// The q-family and pattern operators which take a delimited body.
pub fn is_quotelike(word: &str) -> bool {
    matches!(word, "q" | "qq" | "qw" | "qx")
}

pub fn is_pattern_operator(word: &str) -> bool {
    matches!(word, "m" | "qr" | "s" | "tr" | "y")
}
